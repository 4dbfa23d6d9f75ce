use axum::{Json, extract::State, http::StatusCode};
use tracing::{debug, instrument};

use tollgate_core::{AppError, ErrorBody};
use tollgate_models::auth::{
    LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest, RefreshTokenResponse,
};
use tollgate_models::users::RegisterRequest;

use crate::middleware::auth::AuthUser;
use crate::middleware::client_context::ClientContext;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    AuthService::register(&state, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Log in and receive an access token and a refresh token
///
/// The refresh token is bound to the `User-Agent` header. Any earlier
/// refresh session of this user, or on this client, is revoked.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    params(
        ("User-Agent" = String, Header, description = "Client context the refresh token is bound to")
    ),
    responses(
        (status = 201, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials, missing fields or missing User-Agent", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, client_context, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    client_context: ClientContext,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let response = AuthService::login(&state, dto, client_context).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange a refresh token for a new access token
///
/// Requires the current access token as bearer. On this route every
/// authentication failure, including a rejected bearer token, is reported
/// as 400.
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    request_body = RefreshTokenRequest,
    params(
        ("User-Agent" = String, Header, description = "Client context the refresh token is bound to")
    ),
    responses(
        (status = 201, description = "New access token issued", body = RefreshTokenResponse),
        (status = 400, description = "Invalid token or missing User-Agent", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, auth_user, client_context, dto))]
pub async fn refresh_token(
    State(state): State<AppState>,
    auth_user: Result<AuthUser, AppError>,
    client_context: ClientContext,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<(StatusCode, Json<RefreshTokenResponse>), AppError> {
    let AuthUser(principal) = auth_user.map_err(|e| {
        debug!(error = %e, "Access guard rejected refresh request");
        AppError::invalid_token()
    })?;

    let response = AuthService::refresh(&state, &principal, dto, client_context).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Revoke the refresh session for this client
///
/// Access tokens already issued stay valid until they expire.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    params(
        ("User-Agent" = String, Header, description = "Client context whose session is revoked")
    ),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Missing User-Agent", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    client_context: ClientContext,
) -> Result<Json<MessageResponse>, AppError> {
    let revoked = AuthService::logout(&state, &principal, client_context).await?;
    debug!(user_id = %principal.id, revoked, "Logged out");
    Ok(Json(MessageResponse::new("Logged out successfully")))
}
