//! Request-time authentication.
//!
//! - [`auth`]: the Access Guard extractor and capability-gated extractors
//! - [`client_context`]: the `User-Agent` string refresh sessions are bound to
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <access_token>`
//! 2. [`auth::AuthUser`] verifies the token against the access secret
//! 3. The decoded principal is handed to the handler as an explicit argument
//! 4. Capability extractors additionally check a bit of the principal's bitfield
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireManageAccounts};
//!
//! async fn me(AuthUser(principal): AuthUser) -> impl IntoResponse { /* ... */ }
//!
//! async fn delete_user(RequireManageAccounts(admin): RequireManageAccounts) -> impl IntoResponse {
//!     // Only runs if the token carries the manage-accounts bit
//! }
//! ```

pub mod auth;
pub mod client_context;
