//! # Tollgate Models
//!
//! Domain models and request/response DTOs.
//!
//! - [`auth`]: login, refresh and logout payloads
//! - [`sessions`]: persisted refresh session records
//! - [`users`]: user accounts and registration payloads

pub mod auth;
pub mod sessions;
pub mod users;

pub use auth::{LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest, RefreshTokenResponse};
pub use sessions::{NewRefreshSession, RefreshSession};
pub use users::{MeResponse, RegisterRequest, UpdateRoleRequest, User, UserWithPassword};
