use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use hospital_api::{create_app, AppConfig, AppState};
use hospital_domain::auth::{TokenConfig, TokenService};
use hospital_domain::database::initialize_database_pool;
use hospital_domain::seed::{seed_database, SeedConfig};

/// The main entry point for the hospital API server
///
/// This function:
/// 1. Loads environment variables from an optional .env file
/// 2. Sets up tracing
/// 3. Opens the database pool and runs migrations
/// 4. Seeds initial data when SEED_ON_STARTUP is set
/// 5. Serves the router until Ctrl+C or SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting hospital API server");

    let config = AppConfig::from_env().context("invalid server configuration")?;
    let tokens = TokenService::new(TokenConfig::from_env().context("invalid token configuration")?);
    let pool = initialize_database_pool().context("failed to initialize database pool")?;
    info!("Using {}", pool.describe());

    if config.seed_on_startup {
        let report = seed_database(&pool, SeedConfig::from_env())
            .await
            .context("failed to seed database")?;
        info!("Startup seeding finished: {:?}", report);
    }

    let state = AppState::from_pool(pool, tokens, config.environment.clone());
    let app = create_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
