//! Password hashing with bcrypt.
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool
//! and are awaited by the caller.

use bcrypt::{DEFAULT_COST, hash, verify};
use tokio::task;

use crate::errors::AppError;

/// Hashes a plaintext password with the default bcrypt cost.
///
/// # Errors
///
/// Returns an internal error if hashing fails or the blocking task panics.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();

    task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(AppError::internal)?
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// Compares a plaintext password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an internal error if the stored hash is not a valid bcrypt hash.
pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();

    task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(AppError::internal)?
        .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to verify password: {}", e)))
}
