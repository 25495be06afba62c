//! Hydration of matches whose info document has never been fetched.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use matchhub_core::error::AppError;
use matchhub_core::result::AppResult;
use matchhub_core::traits::source::MatchDataSource;
use matchhub_core::traits::store::{BackfillKind, MatchStore, MatchStub};
use matchhub_realtime::SyncProgressHub;

use super::payload;
use super::{ProgressReporter, SyncItemError};
use crate::job::SyncJob;

/// Fetches the full document for every unprocessed match, fills in its
/// metadata, marks it hydrated, and stores all participants.
pub struct UnprocessedMatchHydrationJob {
    store: Arc<dyn MatchStore>,
    source: Arc<dyn MatchDataSource>,
    /// Snapshot taken by `count_items`.
    matches: Vec<MatchStub>,
    synced: usize,
    progress: Option<ProgressReporter>,
}

impl UnprocessedMatchHydrationJob {
    /// Create the job over a store and data source.
    pub fn new(store: Arc<dyn MatchStore>, source: Arc<dyn MatchDataSource>) -> Self {
        Self {
            store,
            source,
            matches: Vec::new(),
            synced: 0,
            progress: None,
        }
    }

    /// Report live progress for `subject` through the hub while running.
    pub fn with_progress(mut self, hub: Arc<SyncProgressHub>, subject: impl Into<String>) -> Self {
        self.progress = Some(ProgressReporter::new(hub, subject.into()));
        self
    }

    async fn hydrate_one(
        &self,
        stub: &MatchStub,
        cancel: &CancellationToken,
    ) -> Result<(), SyncItemError> {
        let doc = self.source.fetch_match(&stub.match_id, cancel).await?;

        let update = payload::metadata_update(&doc, true);
        self.store.apply_update(&stub.match_id, &update).await?;

        for participant in payload::extract_participants(&doc, &stub.match_id) {
            self.store.insert_participant_if_absent(&participant).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl SyncJob for UnprocessedMatchHydrationJob {
    fn name(&self) -> &str {
        "Unprocessed Match Hydration"
    }

    async fn count_items(&mut self, _cancel: &CancellationToken) -> AppResult<usize> {
        self.matches = self
            .store
            .list_needing_backfill(BackfillKind::Unprocessed)
            .await?;
        Ok(self.matches.len())
    }

    async fn process_batch(
        &mut self,
        start_index: usize,
        batch_size: usize,
        cancel: &CancellationToken,
    ) -> AppResult<usize> {
        let batch: Vec<MatchStub> = self
            .matches
            .iter()
            .skip(start_index)
            .take(batch_size)
            .cloned()
            .collect();
        let total = self.matches.len();
        let mut processed = 0;

        for stub in &batch {
            if cancel.is_cancelled() {
                break;
            }

            match self.hydrate_one(stub, cancel).await {
                Ok(()) => {
                    processed += 1;
                    self.synced += 1;
                    if let Some(reporter) = &self.progress {
                        reporter.progress(self.synced, total, Some(&stub.match_id));
                    }
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    warn!(
                        job = self.name(),
                        match_id = %stub.match_id,
                        error = %e,
                        "Failed to hydrate match, skipping"
                    );
                }
            }
        }

        Ok(processed)
    }

    async fn on_complete(&mut self, _cancel: &CancellationToken) {
        info!(job = self.name(), synced = self.synced, "Hydration completed");
        if let Some(reporter) = &self.progress {
            reporter.complete(self.synced);
        }
    }

    async fn on_error(&mut self, error: &AppError, _cancel: &CancellationToken) {
        warn!(job = self.name(), error = %error, "Hydration failed");
        if let Some(reporter) = &self.progress {
            reporter.error(&error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::job::JobStatus;
    use crate::jobs::testutil::{MemorySource, MemoryStore};
    use crate::runner::JobRunner;

    fn runner() -> JobRunner {
        JobRunner::new(10, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_hydrates_matches_and_participants() {
        let ids = ["EUW1_1", "EUW1_2"];
        let store = Arc::new(MemoryStore::with_stubs(&ids, false));
        let source = Arc::new(MemorySource::with_docs(&ids));

        let mut job = UnprocessedMatchHydrationJob::new(store.clone(), source);
        let result = runner().run(&mut job, &CancellationToken::new()).await;

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.items_processed, 2);

        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|(_, u)| u.mark_info_fetched));
        assert!(updates.iter().all(|(_, u)| u.duration_seconds == Some(1843)));

        let participants = store.participants.lock().unwrap();
        assert_eq!(participants.len(), 4, "two participants per match");
        assert!(participants.iter().any(|p| p.puuid == "puuid-a" && p.match_id == "EUW1_1"));
    }

    #[tokio::test]
    async fn test_participant_insert_failure_skips_item() {
        let ids = ["EUW1_1", "EUW1_2"];
        let store = Arc::new(MemoryStore {
            fail_participants_of: ["EUW1_1".to_string()].into_iter().collect(),
            ..MemoryStore::with_stubs(&ids, false)
        });
        let source = Arc::new(MemorySource::with_docs(&ids));

        let mut job = UnprocessedMatchHydrationJob::new(store.clone(), source);
        let result = runner().run(&mut job, &CancellationToken::new()).await;

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.items_processed, 1);

        let participants = store.participants.lock().unwrap();
        assert!(participants.iter().all(|p| p.match_id == "EUW1_2"));
    }

    #[tokio::test]
    async fn test_missing_upstream_match_is_skipped() {
        let store = Arc::new(MemoryStore::with_stubs(&["EUW1_1", "EUW1_2"], false));
        // Only the second id exists upstream.
        let source = Arc::new(MemorySource::with_docs(&["EUW1_2"]));

        let mut job = UnprocessedMatchHydrationJob::new(store.clone(), source);
        let result = runner().run(&mut job, &CancellationToken::new()).await;

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.items_processed, 1);
        assert_eq!(store.updated_ids(), vec!["EUW1_2"]);
    }
}
