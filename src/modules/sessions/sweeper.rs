use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::service::SessionService;

/// Deletes expired refresh sessions every `interval`.
///
/// Lookups already ignore expired rows; this only keeps the table small.
#[must_use]
pub fn spawn_session_sweeper(db: PgPool, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            match SessionService::purge_expired(&db).await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired refresh sessions"),
                Err(e) => error!(error = %e, "Failed to purge expired refresh sessions"),
            }
        }
    })
}
