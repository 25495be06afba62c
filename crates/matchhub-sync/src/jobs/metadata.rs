//! Backfill for matches already hydrated but missing queue id, end
//! timestamp, or duration metadata.

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

/// Re-fetches processed matches whose metadata columns are still empty and
/// fills them in.
pub struct MatchMetadataBackfillJob {
    store: Arc<dyn MatchStore>,
    source: Arc<dyn MatchDataSource>,
    /// Snapshot taken by `count_items`; batch slicing runs against this,
    /// not against the live table.
    matches: Vec<MatchStub>,
    synced: usize,
    progress: Option<ProgressReporter>,
}

impl MatchMetadataBackfillJob {
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

    async fn sync_one(
        &self,
        stub: &MatchStub,
        cancel: &CancellationToken,
    ) -> Result<(), SyncItemError> {
        let doc = self.source.fetch_match(&stub.match_id, cancel).await?;
        let update = payload::metadata_update(&doc, false);

        // Old documents occasionally carry neither a queue id nor a usable
        // timestamp; leave the row alone rather than writing an empty update.
        if update.queue_id.is_some() || update.game_end_timestamp.is_some() {
            self.store.apply_update(&stub.match_id, &update).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl SyncJob for MatchMetadataBackfillJob {
    fn name(&self) -> &str {
        "Processed Match Metadata Backfill"
    }

    async fn count_items(&mut self, _cancel: &CancellationToken) -> AppResult<usize> {
        self.matches = self
            .store
            .list_needing_backfill(BackfillKind::MissingMetadata)
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

            match self.sync_one(stub, cancel).await {
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
                        "Failed to backfill match, skipping"
                    );
                }
            }
        }

        Ok(processed)
    }

    async fn on_complete(&mut self, _cancel: &CancellationToken) {
        info!(job = self.name(), synced = self.synced, "Backfill completed");
        if let Some(reporter) = &self.progress {
            reporter.complete(self.synced);
        }
    }

    async fn on_error(&mut self, error: &AppError, _cancel: &CancellationToken) {
        warn!(job = self.name(), error = %error, "Backfill failed");
        if let Some(reporter) = &self.progress {
            reporter.error(&error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use matchhub_core::config::realtime::RealtimeConfig;
    use matchhub_core::types::id::UserId;

    use crate::job::JobStatus;
    use crate::jobs::testutil::{MemorySource, MemoryStore};
    use crate::runner::JobRunner;

    fn runner() -> JobRunner {
        JobRunner::new(2, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_backfills_every_candidate() {
        let ids = ["EUW1_1", "EUW1_2", "EUW1_3"];
        let store = Arc::new(MemoryStore::with_stubs(&ids, true));
        let source = Arc::new(MemorySource::with_docs(&ids));

        let mut job = MatchMetadataBackfillJob::new(store.clone(), source);
        let result = runner().run(&mut job, &CancellationToken::new()).await;

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.total_items, 3);
        assert_eq!(result.items_processed, 3);
        assert_eq!(store.updated_ids(), vec!["EUW1_1", "EUW1_2", "EUW1_3"]);

        let updates = store.updates.lock().unwrap();
        assert!(updates.iter().all(|(_, u)| !u.mark_info_fetched));
        assert!(updates.iter().all(|(_, u)| u.queue_id == Some(420)));
    }

    #[tokio::test]
    async fn test_item_failure_is_skipped_not_fatal() {
        let ids = ["EUW1_1", "EUW1_2", "EUW1_3"];
        let store = Arc::new(MemoryStore::with_stubs(&ids, true));
        let mut source = MemorySource::with_docs(&ids);
        source.fail.insert("EUW1_2".to_string());

        let mut job = MatchMetadataBackfillJob::new(store.clone(), Arc::new(source));
        let result = runner().run(&mut job, &CancellationToken::new()).await;

        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.items_processed, 2, "failed item is not counted");
        assert_eq!(store.updated_ids(), vec!["EUW1_1", "EUW1_3"]);
    }

    #[tokio::test]
    async fn test_progress_broadcast_to_subscriber() {
        let ids = ["EUW1_1", "EUW1_2"];
        let store = Arc::new(MemoryStore::with_stubs(&ids, true));
        let source = Arc::new(MemorySource::with_docs(&ids));

        let hub = Arc::new(SyncProgressHub::new(RealtimeConfig::default()));
        let (conn, mut rx) = hub.register(UserId::new());
        hub.handle_frame(&conn, r#"{"type":"subscribe","puuid":"subject-1"}"#);

        let mut job =
            MatchMetadataBackfillJob::new(store, source).with_progress(hub.clone(), "subject-1");
        let result = runner().run(&mut job, &CancellationToken::new()).await;
        assert_eq!(result.status, JobStatus::Completed);

        let first = rx.try_recv().unwrap();
        assert!(first.contains(r#""status":"syncing""#));
        assert!(first.contains(r#""progress":1"#));
        assert!(first.contains(r#""matchId":"EUW1_1""#));

        let second = rx.try_recv().unwrap();
        assert!(second.contains(r#""progress":2"#));

        let last = rx.try_recv().unwrap();
        assert!(last.contains(r#""status":"completed""#));
        assert!(last.contains(r#""totalSynced":2"#));
    }

    #[tokio::test]
    async fn test_empty_metadata_payload_counts_without_update() {
        let store = Arc::new(MemoryStore::with_stubs(&["EUW1_1"], true));
        let mut source = MemorySource::default();
        source.docs.insert(
            "EUW1_1".to_string(),
            serde_json::json!({"info": {"gameMode": "CLASSIC"}}),
        );

        let mut job = MatchMetadataBackfillJob::new(store.clone(), Arc::new(source));
        let result = runner().run(&mut job, &CancellationToken::new()).await;

        assert_eq!(result.items_processed, 1);
        assert!(store.updated_ids().is_empty(), "no usable metadata, no write");
    }
}
