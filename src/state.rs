use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tollgate_auth::TokenCodec;
use tollgate_config::{AppConfig, CorsConfig, JwtConfig};
use tollgate_core::PermissionTable;
use tollgate_db::{init_db_pool, run_migrations};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub codec: Arc<TokenCodec>,
    pub permissions: PermissionTable,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: PgPool, jwt_config: &JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            db,
            codec: Arc::new(TokenCodec::new(jwt_config)),
            permissions: PermissionTable::standard(),
            cors_config,
        }
    }
}

/// Connects to the database, applies migrations and builds the shared state.
pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let db = init_db_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    run_migrations(&db)
        .await
        .context("failed to apply database migrations")?;

    Ok(AppState::new(db, &config.jwt, config.cors.clone()))
}
