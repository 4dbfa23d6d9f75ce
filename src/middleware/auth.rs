use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tollgate_auth::Principal;
use tollgate_core::AppError;
use tollgate_core::permissions::Capabilities;
use tracing::debug;

use crate::state::AppState;

/// Access Guard: verifies the bearer access token and yields its principal.
///
/// Purely stateless. The refresh session store is never consulted, so an
/// access token stays valid until it expires. The verified principal is
/// cached in the request extensions, so stacking several guards on one
/// handler verifies the token once.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.0.has_capability(capability)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<AuthUser>() {
            return Ok(cached.clone());
        }

        let token = bearer_token(parts)
            .ok_or_else(|| AppError::unauthorized("Missing or malformed authorization header"))?;

        let principal = state.codec.verify_access(token).map_err(|reason| {
            debug!(%reason, "Access token rejected");
            AppError::unauthorized("Invalid or expired token")
        })?;

        let auth_user = AuthUser(principal);
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

/// Generates an extractor that runs the Access Guard and then requires a
/// capability bit, rejecting with `forbidden` when it is absent.
#[macro_export]
macro_rules! require_capability {
    ($name:ident, $capability:path) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = tollgate_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                if !auth_user.has_capability($capability) {
                    return Err(tollgate_core::AppError::forbidden(format!(
                        "Access denied. Missing required capability: {}",
                        stringify!($capability)
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_capability!(
    RequireManageAccounts,
    tollgate_core::permissions::MANAGE_ACCOUNTS
);
