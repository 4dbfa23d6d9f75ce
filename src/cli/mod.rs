//! Administrative commands backing `tollgate-cli`.
//!
//! Admin accounts cannot be created through the HTTP API; the first one is
//! made here and can then promote others over `PATCH /api/users/{id}/role`.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;

use tollgate_core::{Role, hash_password};
use tollgate_models::users::User;

use crate::modules::sessions::service::SessionService;
use crate::modules::users::service::UserService;

pub async fn create_admin(db: &PgPool, email: &str, full_name: &str, password: &str) -> Result<User> {
    if email.trim().is_empty() || full_name.trim().is_empty() {
        bail!("email and full name must not be empty");
    }
    if password.len() < 8 {
        bail!("password must be at least 8 characters");
    }

    let password_hash = hash_password(password)
        .await
        .map_err(|e| e.error)
        .context("Failed to hash password")?;

    UserService::create(db, email, &password_hash, full_name, Role::Admin)
        .await
        .map_err(|e| e.error)
}

pub async fn set_role(db: &PgPool, email: &str, role: Role) -> Result<User> {
    UserService::set_role_by_email(db, email, role)
        .await
        .map_err(|e| e.error)
}

pub async fn purge_expired_sessions(db: &PgPool) -> Result<u64> {
    SessionService::purge_expired(db).await.map_err(|e| e.error)
}
