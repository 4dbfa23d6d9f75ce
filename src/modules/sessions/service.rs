use anyhow::Context;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::instrument;
use uuid::Uuid;

use tollgate_core::AppError;
use tollgate_models::sessions::{NewRefreshSession, RefreshSession};

const SESSION_COLUMNS: &str = "id, user_id, token_hash, client_context, expires_at, created_at";

/// Hash a refresh token so raw values never touch the database.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct SessionService;

impl SessionService {
    pub async fn create<'e, E>(db: E, new: &NewRefreshSession) -> Result<RefreshSession, AppError>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO refresh_sessions (user_id, token_hash, client_context, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {SESSION_COLUMNS}"
        );

        let session = sqlx::query_as::<_, RefreshSession>(&query)
            .bind(new.user_id)
            .bind(&new.token_hash)
            .bind(&new.client_context)
            .bind(new.expires_at)
            .fetch_one(db)
            .await
            .context("Failed to insert refresh session")?;

        Ok(session)
    }

    /// Looks up a live record by exact token and client context.
    pub async fn find_live<'e, E>(
        db: E,
        token: &str,
        client_context: &str,
    ) -> Result<Option<RefreshSession>, AppError>
    where
        E: PgExecutor<'e>,
    {
        Self::find_live_at(db, token, client_context, Utc::now()).await
    }

    /// Records with `expires_at <= now` are treated as absent even if the
    /// sweeper has not removed them yet.
    pub async fn find_live_at<'e, E>(
        db: E,
        token: &str,
        client_context: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshSession>, AppError>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM refresh_sessions
             WHERE token_hash = $1 AND client_context = $2 AND expires_at > $3"
        );

        let session = sqlx::query_as::<_, RefreshSession>(&query)
            .bind(hash_token(token))
            .bind(client_context)
            .bind(now)
            .fetch_optional(db)
            .await
            .context("Failed to look up refresh session")?;

        Ok(session)
    }

    /// Deletes every record owned by `user_id` or bound to `client_context`.
    ///
    /// Broader than per-user revocation: a login on a shared device also
    /// evicts a different user's session left behind on it.
    pub async fn revoke_by_user_or_context<'e, E>(
        db: E,
        user_id: Uuid,
        client_context: &str,
    ) -> Result<u64, AppError>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1 OR client_context = $2")
                .bind(user_id)
                .bind(client_context)
                .execute(db)
                .await
                .context("Failed to revoke refresh sessions")?;

        Ok(result.rows_affected())
    }

    /// Deletes the records of one user on one client context.
    pub async fn revoke_for_user_context<'e, E>(
        db: E,
        user_id: Uuid,
        client_context: &str,
    ) -> Result<u64, AppError>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1 AND client_context = $2")
                .bind(user_id)
                .bind(client_context)
                .execute(db)
                .await
                .context("Failed to revoke refresh sessions for client")?;

        Ok(result.rows_affected())
    }

    pub async fn count_for_user<'e, E>(db: E, user_id: Uuid) -> Result<i64, AppError>
    where
        E: PgExecutor<'e>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM refresh_sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(db)
                .await
                .context("Failed to count refresh sessions")?;

        Ok(count)
    }

    /// Revokes prior records for the pair and stores the new one, atomically.
    ///
    /// Concurrent callers are serialized by transaction-scoped advisory locks,
    /// taken on the user first and the client context second.
    #[instrument(skip(db, new), fields(user_id = %new.user_id, client_context = %new.client_context))]
    pub async fn replace(db: &PgPool, new: &NewRefreshSession) -> Result<RefreshSession, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin refresh session transaction")?;

        lock_scope(&mut tx, &format!("refresh_session:user:{}", new.user_id)).await?;
        lock_scope(
            &mut tx,
            &format!("refresh_session:context:{}", new.client_context),
        )
        .await?;

        let revoked =
            Self::revoke_by_user_or_context(&mut *tx, new.user_id, &new.client_context).await?;
        let session = Self::create(&mut *tx, new).await?;

        tx.commit()
            .await
            .context("Failed to commit refresh session transaction")?;

        tracing::debug!(revoked, session_id = %session.id, "Refresh session replaced");
        Ok(session)
    }

    pub async fn purge_expired(db: &PgPool) -> Result<u64, AppError> {
        Self::purge_expired_at(db, Utc::now()).await
    }

    pub async fn purge_expired_at(db: &PgPool, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(db)
            .await
            .context("Failed to purge expired refresh sessions")?;

        Ok(result.rows_affected())
    }
}

async fn lock_scope(conn: &mut PgConnection, key: &str) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(conn)
        .await
        .context("Failed to acquire refresh session lock")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let digest = hash_token("refresh-token");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hash_token("refresh-token"));
        assert_ne!(digest, hash_token("refresh-token2"));
    }

    #[test]
    fn test_hash_token_known_vector() {
        assert_eq!(
            hash_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
