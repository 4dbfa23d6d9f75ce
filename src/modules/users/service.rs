use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use tollgate_core::{AppError, Role};
use tollgate_models::users::{User, UserWithPassword};

const USER_COLUMNS: &str = "id, email, full_name, role, created_at, updated_at";

pub struct UserService;

impl UserService {
    pub async fn find_by_email(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<UserWithPassword>, AppError> {
        let query = format!("SELECT {USER_COLUMNS}, password FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, UserWithPassword>(&query)
            .bind(email)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user by email")?;

        Ok(user)
    }

    /// Inserts a user with an already-hashed password.
    ///
    /// A concurrent registration of the same email surfaces as
    /// `already_registered`, not as a server fault.
    #[instrument(skip(db, password_hash))]
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let query = format!(
            "INSERT INTO users (email, password, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(password_hash)
            .bind(full_name)
            .bind(role)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if e
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation())
                {
                    return AppError::already_registered();
                }
                AppError::internal(anyhow::Error::new(e).context("Failed to insert user"))
            })
    }

    #[instrument(skip(db))]
    pub async fn set_role(db: &PgPool, id: Uuid, role: Role) -> Result<User, AppError> {
        let query = format!(
            "UPDATE users SET role = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(db)
            .await
            .context("Failed to update user role")?
            .ok_or_else(|| AppError::not_found(format!("User with id {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn set_role_by_email(db: &PgPool, email: &str, role: Role) -> Result<User, AppError> {
        let query = format!(
            "UPDATE users SET role = $2, updated_at = NOW()
             WHERE email = $1
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(role)
            .fetch_optional(db)
            .await
            .context("Failed to update user role")?
            .ok_or_else(|| AppError::not_found(format!("User with email {} not found", email)))
    }

    /// Deletes a user; their refresh sessions go with them via the foreign key.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete user")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with id {} not found", id)));
        }

        Ok(())
    }
}
