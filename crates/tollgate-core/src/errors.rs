//! Application error type with HTTP response conversion.
//!
//! Every failure that crosses a component boundary is an [`AppError`]: a
//! closed [`ErrorKind`] tag plus an [`anyhow::Error`] carrying the detail.
//! Handlers return `Result<_, AppError>` and axum renders the error as a
//! stable `{"message", "status"}` body.
//!
//! Server faults never leak their detail to the client. The full error chain
//! is logged instead and the body carries a fixed message.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Message returned to clients for every server-side fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The closed set of failure kinds the API can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-fixable input problem (missing field, missing header, bad body).
    InvalidRequest,
    /// Registration attempted with an email that already exists.
    AlreadyRegistered,
    /// Login attempted for an email with no account.
    NotRegistered,
    /// Password did not match the stored hash.
    BadCredentials,
    /// Refresh token failed verification or has no live session record.
    InvalidToken,
    /// Missing or invalid access token.
    Unauthorized,
    /// Authenticated, but lacking the required capability.
    Forbidden,
    NotFound,
    /// Token signing failed.
    IssuanceFailed,
    /// Persistence or other server-side fault.
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidRequest
            | ErrorKind::AlreadyRegistered
            | ErrorKind::NotRegistered
            | ErrorKind::BadCredentials
            | ErrorKind::InvalidToken => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::IssuanceFailed | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this kind is a server fault whose detail must stay internal.
    pub fn is_server_fault(self) -> bool {
        matches!(self, ErrorKind::IssuanceFailed | ErrorKind::Internal)
    }
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, Error::msg(message.into()))
    }

    pub fn already_registered() -> Self {
        Self::new(
            ErrorKind::AlreadyRegistered,
            Error::msg("Email is already registered"),
        )
    }

    /// Uses the same message as [`AppError::bad_credentials`] so callers
    /// cannot probe which emails have accounts.
    pub fn not_registered() -> Self {
        Self::new(ErrorKind::NotRegistered, Error::msg("Invalid email or password"))
    }

    pub fn bad_credentials() -> Self {
        Self::new(ErrorKind::BadCredentials, Error::msg("Invalid email or password"))
    }

    pub fn invalid_token() -> Self {
        Self::new(ErrorKind::InvalidToken, Error::msg("Invalid or expired token"))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, Error::msg(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, Error::msg(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, Error::msg(message.into()))
    }

    pub fn issuance_failed<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::IssuanceFailed, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// The message a client is allowed to see.
    pub fn public_message(&self) -> String {
        if self.kind.is_server_fault() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {:#}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.kind.is_server_fault() {
            error!(kind = ?self.kind, error = ?self.error, "Request failed with a server fault");
        }

        let body = Json(ErrorBody {
            message: self.public_message(),
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::BadCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::InvalidToken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorKind::IssuanceFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_login_failures_share_a_message() {
        assert_eq!(
            AppError::not_registered().public_message(),
            AppError::bad_credentials().public_message()
        );
    }

    #[test]
    fn test_foreign_errors_become_internal() {
        let err: AppError = std::io::Error::other("disk on fire").into();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_client_error_body_shape() {
        let response = AppError::invalid_request("email is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "email is required");
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_server_fault_detail_is_suppressed() {
        let response =
            AppError::internal(anyhow::anyhow!("connection refused at 10.0.0.4")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("10.0.0.4"));
    }
}
