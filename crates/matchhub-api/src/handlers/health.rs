//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/health — liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/health/detailed — database connectivity plus sync gauges.
pub async fn health_detailed(State(state): State<AppState>) -> Json<Value> {
    let database = state.db.health_check().await.unwrap_or(false);
    let unprocessed = state.match_repo.count_unprocessed().await.unwrap_or(-1);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "unprocessed_matches": unprocessed,
        "ws_connections": state.hub.connection_count(),
    }))
}
