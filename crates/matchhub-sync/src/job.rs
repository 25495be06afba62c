//! The batch job contract and per-run result types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use matchhub_core::error::AppError;
use matchhub_core::result::AppResult;

/// Terminal status of a job run.
///
/// Serialized in PascalCase — the admin API surfaces these strings
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Every batch ran; `on_complete` fired.
    Completed,
    /// `count_items` or a batch raised; `on_error` fired.
    Failed,
    /// The token fired; the run stopped between batches and neither hook
    /// fired.
    Cancelled,
}

impl JobStatus {
    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of one job run, created by [`crate::JobRunner::run`] and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    /// Human-readable job name.
    pub job_name: String,
    /// Terminal status.
    pub status: JobStatus,
    /// Item count reported by `count_items` (0 when counting failed).
    pub total_items: usize,
    /// Sum of the per-batch processed counts.
    pub items_processed: usize,
    /// Wall-clock run duration.
    pub duration_seconds: f64,
    /// Failure description when `status` is Failed.
    pub error: Option<String>,
}

/// A batch synchronization workload.
///
/// The runner calls `count_items` exactly once per run, before any batch;
/// its result defines the progress denominator and the batch slicing, and
/// the job must retain a stable snapshot so that concurrent mutation of
/// the backing store cannot change what later batches enumerate.
///
/// Per-item failures inside a batch are the job's own responsibility:
/// catch them, log them, leave them out of the returned count, and keep
/// going. Only a batch-level failure (the returned `Err`) aborts the run.
#[async_trait]
pub trait SyncJob: Send {
    /// Human-readable job name used in logs and results.
    fn name(&self) -> &str;

    /// Count the items this run will process and snapshot them.
    async fn count_items(&mut self, cancel: &CancellationToken) -> AppResult<usize>;

    /// Process one slice of the snapshot; returns the number of items
    /// successfully processed.
    async fn process_batch(
        &mut self,
        start_index: usize,
        batch_size: usize,
        cancel: &CancellationToken,
    ) -> AppResult<usize>;

    /// Invoked once after the final batch of a successful run.
    async fn on_complete(&mut self, _cancel: &CancellationToken) {}

    /// Invoked once when the run aborts with a batch-level failure.
    async fn on_error(&mut self, _error: &AppError, _cancel: &CancellationToken) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(JobStatus::Completed.to_string(), "Completed");
        assert_eq!(
            serde_json::to_string(&JobStatus::Cancelled).unwrap(),
            r#""Cancelled""#
        );
    }

    #[test]
    fn test_job_result_serializes_camel_case() {
        let result = JobResult {
            job_name: "Processed Match Metadata Backfill".to_string(),
            status: JobStatus::Completed,
            total_items: 23,
            items_processed: 23,
            duration_seconds: 1.5,
            error: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["jobName"], "Processed Match Metadata Backfill");
        assert_eq!(value["status"], "Completed");
        assert_eq!(value["totalItems"], 23);
        assert_eq!(value["itemsProcessed"], 23);
        assert_eq!(value["durationSeconds"], 1.5);
        assert!(value["error"].is_null());
    }
}
