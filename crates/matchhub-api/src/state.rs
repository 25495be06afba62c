//! Application state shared across all handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use matchhub_core::config::AppConfig;
use matchhub_core::traits::source::MatchDataSource;
use matchhub_core::traits::store::MatchStore;
use matchhub_database::DatabasePool;
use matchhub_database::repositories::MatchRepository;
use matchhub_realtime::SyncProgressHub;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped (or cheaply cloneable) so the state clones per request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool, used directly only for health checks.
    pub db: DatabasePool,
    /// Match repository (admin lookups and health counters).
    pub match_repo: Arc<MatchRepository>,
    /// Store consumed by the backfill jobs.
    pub store: Arc<dyn MatchStore>,
    /// Riot data source consumed by the backfill jobs.
    pub source: Arc<dyn MatchDataSource>,
    /// Sync progress hub.
    pub hub: Arc<SyncProgressHub>,
    /// Server shutdown token; job runs and connections derive from it.
    pub shutdown: CancellationToken,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}
