use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{HeaderMapExt, UserAgent};
use tollgate_core::AppError;

/// The `User-Agent` string a refresh session is scoped to.
///
/// Extraction never fails; handlers decide whether the context is required
/// and at which step of their flow that is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext(pub Option<String>);

impl ClientContext {
    pub fn require(self) -> Result<String, AppError> {
        self.0
            .ok_or_else(|| AppError::invalid_request("User-Agent header is required"))
    }
}

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .headers
            .typed_get::<UserAgent>()
            .map(|user_agent| user_agent.as_str().trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self(context))
    }
}
