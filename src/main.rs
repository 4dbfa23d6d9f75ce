use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info};

use tollgate::logging::init_tracing;
use tollgate::modules::sessions::sweeper::spawn_session_sweeper;
use tollgate::router::init_router;
use tollgate::state::init_app_state;
use tollgate_config::AppConfig;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match init_tracing(config.server.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!(error = ?e, "Server terminated with an error");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = init_app_state(&config).await?;

    let sweeper = spawn_session_sweeper(state.db.clone(), config.server.session_sweep_interval);

    let app = init_router(state);
    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(%addr, "Server listening");
    info!("Swagger UI available at http://localhost:{}/swagger-ui", config.server.port);
    info!("Scalar UI available at http://localhost:{}/scalar", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
