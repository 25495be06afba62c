//! Administrative backfill triggers.
//!
//! Runs execute inline: the handler blocks until the job finishes and
//! returns the [`JobResult`] verbatim. The run is cancelled if the server
//! begins shutting down.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use matchhub_core::error::AppError;
use matchhub_entity::lol_match::model::LolMatch;
use matchhub_sync::job::JobResult;
use matchhub_sync::jobs::{MatchMetadataBackfillJob, UnprocessedMatchHydrationJob};
use matchhub_sync::runner::JobRunner;

use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::state::AppState;

/// Which backfill job to run.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillJobKind {
    /// Processed-match metadata backfill.
    Metadata,
    /// Unprocessed-match hydration.
    Hydration,
}

/// POST /api/admin/backfill request body.
#[derive(Debug, Deserialize)]
pub struct BackfillRequest {
    /// Job to run.
    pub kind: BackfillJobKind,
    /// Batch size override; defaults to the configured sync batch size.
    pub batch_size: Option<usize>,
    /// Account whose subscribers should receive live progress.
    pub puuid: Option<String>,
}

/// POST /api/admin/backfill/all response body, mirroring the combined
/// trigger of the v1 API.
#[derive(Debug, Serialize)]
pub struct FullBackfillResponse {
    /// Metadata backfill result.
    pub processed: JobResult,
    /// Hydration result.
    pub unprocessed: JobResult,
}

/// POST /api/admin/backfill — run a single backfill job to completion.
pub async fn run_backfill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<BackfillRequest>,
) -> Result<Json<JobResult>, ApiError> {
    info!(%user_id, kind = ?request.kind, "Backfill triggered");

    let runner = runner_for(&state, request.batch_size);
    let cancel = state.shutdown.child_token();

    let result = match request.kind {
        BackfillJobKind::Metadata => {
            let mut job =
                MatchMetadataBackfillJob::new(state.store.clone(), state.source.clone());
            if let Some(puuid) = &request.puuid {
                job = job.with_progress(state.hub.clone(), puuid);
            }
            runner.run(&mut job, &cancel).await
        }
        BackfillJobKind::Hydration => {
            let mut job =
                UnprocessedMatchHydrationJob::new(state.store.clone(), state.source.clone());
            if let Some(puuid) = &request.puuid {
                job = job.with_progress(state.hub.clone(), puuid);
            }
            runner.run(&mut job, &cancel).await
        }
    };

    Ok(Json(result))
}

/// POST /api/admin/backfill/all — metadata backfill followed by hydration.
pub async fn run_full_backfill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<FullBackfillResponse>, ApiError> {
    info!(%user_id, "Full backfill triggered");

    let runner = runner_for(&state, None);
    let cancel = state.shutdown.child_token();

    let mut metadata_job =
        MatchMetadataBackfillJob::new(state.store.clone(), state.source.clone());
    let processed = runner.run(&mut metadata_job, &cancel).await;

    let mut hydration_job =
        UnprocessedMatchHydrationJob::new(state.store.clone(), state.source.clone());
    let unprocessed = runner.run(&mut hydration_job, &cancel).await;

    Ok(Json(FullBackfillResponse {
        processed,
        unprocessed,
    }))
}

/// GET /api/admin/matches/{id} — inspect one match row.
pub async fn get_match(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(match_id): Path<String>,
) -> Result<Json<LolMatch>, ApiError> {
    let row = state
        .match_repo
        .find_by_id(&match_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Match '{match_id}' not found")))?;
    Ok(Json(row))
}

fn runner_for(state: &AppState, batch_size: Option<usize>) -> JobRunner {
    let sync = &state.config.sync;
    JobRunner::new(
        batch_size.unwrap_or(sync.default_batch_size),
        Duration::from_millis(sync.batch_delay_ms),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backfill_request_parses() {
        let request: BackfillRequest =
            serde_json::from_str(r#"{"kind":"metadata","batch_size":5,"puuid":"abc"}"#).unwrap();
        assert!(matches!(request.kind, BackfillJobKind::Metadata));
        assert_eq!(request.batch_size, Some(5));
        assert_eq!(request.puuid.as_deref(), Some("abc"));

        let request: BackfillRequest = serde_json::from_str(r#"{"kind":"hydration"}"#).unwrap();
        assert!(matches!(request.kind, BackfillJobKind::Hydration));
        assert!(request.batch_size.is_none());
    }
}
