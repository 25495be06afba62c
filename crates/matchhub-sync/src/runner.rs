//! Job runner — drives a [`SyncJob`] through fixed-size batches.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use matchhub_core::config::sync::SyncConfig;

use crate::job::{JobResult, JobStatus, SyncJob};

/// Drives any [`SyncJob`] through sequential fixed-size batches.
///
/// A single run never executes two batches concurrently: batch items are
/// not guaranteed independent-write-safe against the backing store, so the
/// loop is strictly sequential. Independent runs may execute concurrently
/// as separate tasks.
#[derive(Debug, Clone)]
pub struct JobRunner {
    batch_size: usize,
    inter_batch_delay: Duration,
}

impl JobRunner {
    /// Create a runner with an explicit batch size and inter-batch pause.
    /// A zero batch size is clamped to one.
    pub fn new(batch_size: usize, inter_batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            inter_batch_delay,
        }
    }

    /// Create a runner from the sync configuration defaults.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.default_batch_size,
            Duration::from_millis(config.batch_delay_ms),
        )
    }

    /// Run `job` to completion.
    ///
    /// - `count_items` is called exactly once, before any batch; a zero
    ///   count completes immediately.
    /// - Batches cover `[0, total)` in `batch_size` steps with the final
    ///   slice clamped; the token is checked before each batch and the
    ///   inter-batch pause is skipped after the last one.
    /// - Exactly one of `on_complete` / `on_error` fires, on normal
    ///   completion or batch-level failure respectively. Cancellation
    ///   stops the run between batches with status Cancelled and invokes
    ///   *neither* hook.
    pub async fn run(&self, job: &mut dyn SyncJob, cancel: &CancellationToken) -> JobResult {
        let name = job.name().to_string();
        let started = Instant::now();

        info!(job = %name, batch_size = self.batch_size, "Starting job run");

        if cancel.is_cancelled() {
            info!(job = %name, "Job cancelled before counting");
            return self.finish(&name, JobStatus::Cancelled, 0, 0, started, None);
        }

        let total = match job.count_items(cancel).await {
            Ok(total) => total,
            Err(e) => {
                warn!(job = %name, error = %e, "Job failed while counting items");
                job.on_error(&e, cancel).await;
                return self.finish(&name, JobStatus::Failed, 0, 0, started, Some(e.to_string()));
            }
        };

        if total == 0 {
            info!(job = %name, "Nothing to process");
            job.on_complete(cancel).await;
            return self.finish(&name, JobStatus::Completed, 0, 0, started, None);
        }

        let mut processed = 0usize;
        let mut start_index = 0usize;

        while start_index < total {
            if cancel.is_cancelled() {
                info!(job = %name, processed, total, "Job cancelled between batches");
                return self.finish(&name, JobStatus::Cancelled, total, processed, started, None);
            }

            let size = self.batch_size.min(total - start_index);
            match job.process_batch(start_index, size, cancel).await {
                Ok(count) => processed += count,
                Err(e) => {
                    warn!(job = %name, start_index, error = %e, "Batch failed, aborting run");
                    job.on_error(&e, cancel).await;
                    return self.finish(
                        &name,
                        JobStatus::Failed,
                        total,
                        processed,
                        started,
                        Some(e.to_string()),
                    );
                }
            }

            start_index += self.batch_size;

            if start_index < total && !self.inter_batch_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.inter_batch_delay) => {}
                }
            }
        }

        job.on_complete(cancel).await;
        info!(job = %name, processed, total, "Job run completed");
        self.finish(&name, JobStatus::Completed, total, processed, started, None)
    }

    fn finish(
        &self,
        name: &str,
        status: JobStatus,
        total_items: usize,
        items_processed: usize,
        started: Instant,
        error: Option<String>,
    ) -> JobResult {
        JobResult {
            job_name: name.to_string(),
            status,
            total_items,
            items_processed,
            duration_seconds: started.elapsed().as_secs_f64(),
            error,
        }
    }
}
