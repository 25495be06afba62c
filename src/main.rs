//! MatchHub Server — League match-history synchronization service
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use matchhub_core::config::AppConfig;
use matchhub_core::error::AppError;
use matchhub_core::traits::source::MatchDataSource;
use matchhub_core::traits::store::MatchStore;
use matchhub_database::DatabasePool;
use matchhub_database::repositories::{MatchRepository, ParticipantRepository, PgMatchStore};
use matchhub_realtime::SyncProgressHub;
use matchhub_riot::RiotApiClient;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("MATCHHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting MatchHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    matchhub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Repositories and the store facade ────────────────
    let match_repo = Arc::new(MatchRepository::new(db.pool().clone()));
    let participant_repo = ParticipantRepository::new(db.pool().clone());
    let store: Arc<dyn MatchStore> = Arc::new(PgMatchStore::new(
        (*match_repo).clone(),
        participant_repo,
    ));

    // ── Step 3: Riot API client with its rate gate ───────────────
    let source: Arc<dyn MatchDataSource> = Arc::new(RiotApiClient::new(&config.riot)?);
    tracing::info!(
        budget = config.riot.rate_limit_max_calls,
        window_ms = config.riot.rate_limit_window_ms,
        "Riot API client initialized"
    );

    // ── Step 4: Sync progress hub ────────────────────────────────
    let hub = Arc::new(SyncProgressHub::new(config.realtime.clone()));

    // ── Step 5: Build and start the HTTP server ──────────────────
    let shutdown = CancellationToken::new();

    let state = matchhub_api::AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        match_repo,
        store,
        source,
        hub,
        shutdown: shutdown.clone(),
    };

    let app = matchhub_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("MatchHub server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let serve_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            // Cancels open WebSocket read loops and in-flight job runs.
            serve_shutdown.cancel();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    db.close().await;
    tracing::info!("MatchHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
