//! User account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tollgate_auth::Principal;
use tollgate_core::permissions::{PermissionTable, Role};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A user account as exposed by the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Derives a fresh principal from the account's current role.
    pub fn principal(&self, table: &PermissionTable) -> Principal {
        Principal::new(self.id, self.full_name.clone(), self.role, table)
    }
}

/// A user row including the stored password hash, used only for login.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithPassword {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserWithPassword> for User {
    fn from(row: UserWithPassword) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid email address"))]
    #[schema(example = "a@b.com")]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "Passw0rd!")]
    pub password: String,
    #[validate(length(min = 1, message = "full_name is required"))]
    #[schema(example = "A B")]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// The caller's principal as seen by the Access Guard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub capabilities: u32,
    pub capability_names: Vec<String>,
}

impl From<&Principal> for MeResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            full_name: principal.full_name.clone(),
            role: principal.role,
            capabilities: principal.capabilities.bits(),
            capability_names: principal
                .capabilities
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}
