//! Refresh session records.
//!
//! A refresh session is the server-side half of a refresh token. The token
//! itself is never stored; `token_hash` is the SHA-256 hex digest of it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct RefreshSession {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub client_context: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to persist a new refresh session.
#[derive(Debug, Clone)]
pub struct NewRefreshSession {
    pub user_id: Uuid,
    pub token_hash: String,
    pub client_context: String,
    pub expires_at: DateTime<Utc>,
}

