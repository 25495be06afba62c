//! Concrete backfill job implementations.

pub mod hydration;
pub mod metadata;
mod payload;

pub use hydration::UnprocessedMatchHydrationJob;
pub use metadata::MatchMetadataBackfillJob;

use std::sync::Arc;

use matchhub_core::error::AppError;
use matchhub_core::traits::source::FetchError;
use matchhub_realtime::SyncProgressHub;

/// Failure of a single item inside a batch.
///
/// Item failures are caught by the job, logged, and skipped — except a
/// cancelled fetch, which means the run itself is stopping.
#[derive(Debug, thiserror::Error)]
pub(crate) enum SyncItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] AppError),
}

impl SyncItemError {
    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::Cancelled))
    }
}

/// Optional live progress reporting for a job run, keyed on the account
/// whose sync triggered it.
#[derive(Clone)]
pub(crate) struct ProgressReporter {
    hub: Arc<SyncProgressHub>,
    subject: String,
}

impl ProgressReporter {
    pub(crate) fn new(hub: Arc<SyncProgressHub>, subject: String) -> Self {
        Self { hub, subject }
    }

    pub(crate) fn progress(&self, done: usize, total: usize, current_match_id: Option<&str>) {
        self.hub
            .broadcast_progress(&self.subject, done, total, current_match_id);
    }

    pub(crate) fn complete(&self, total_synced: usize) {
        self.hub.broadcast_complete(&self.subject, total_synced);
    }

    pub(crate) fn error(&self, message: &str) {
        self.hub.broadcast_error(&self.subject, message);
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! In-memory store and source doubles shared by the job tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;

    use matchhub_core::error::AppError;
    use matchhub_core::result::AppResult;
    use matchhub_core::traits::source::{FetchError, MatchDataSource};
    use matchhub_core::traits::store::{
        BackfillKind, MatchStore, MatchStub, MatchUpdate, ParticipantRecord,
    };

    #[derive(Default)]
    pub struct MemoryStore {
        pub stubs: Vec<MatchStub>,
        pub updates: Mutex<Vec<(String, MatchUpdate)>>,
        pub participants: Mutex<Vec<ParticipantRecord>>,
        pub fail_participants_of: HashSet<String>,
    }

    impl MemoryStore {
        pub fn with_stubs(ids: &[&str], info_fetched: bool) -> Self {
            Self {
                stubs: ids
                    .iter()
                    .map(|id| MatchStub {
                        match_id: id.to_string(),
                        info_fetched,
                    })
                    .collect(),
                ..Self::default()
            }
        }

        pub fn updated_ids(&self) -> Vec<String> {
            self.updates
                .lock()
                .unwrap()
                .iter()
                .map(|(id, _)| id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MatchStore for MemoryStore {
        async fn list_needing_backfill(&self, _kind: BackfillKind) -> AppResult<Vec<MatchStub>> {
            Ok(self.stubs.clone())
        }

        async fn apply_update(&self, match_id: &str, update: &MatchUpdate) -> AppResult<()> {
            self.updates
                .lock()
                .unwrap()
                .push((match_id.to_string(), update.clone()));
            Ok(())
        }

        async fn insert_participant_if_absent(&self, record: &ParticipantRecord) -> AppResult<()> {
            if self.fail_participants_of.contains(&record.match_id) {
                return Err(AppError::database("participant insert failed"));
            }
            self.participants.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemorySource {
        pub docs: HashMap<String, Value>,
        pub fail: HashSet<String>,
    }

    impl MemorySource {
        pub fn with_docs(ids: &[&str]) -> Self {
            Self {
                docs: ids
                    .iter()
                    .map(|id| (id.to_string(), sample_doc(id)))
                    .collect(),
                fail: HashSet::new(),
            }
        }
    }

    #[async_trait]
    impl MatchDataSource for MemorySource {
        async fn fetch_match(
            &self,
            match_id: &str,
            _cancel: &CancellationToken,
        ) -> Result<Value, FetchError> {
            if self.fail.contains(match_id) {
                return Err(FetchError::Transient("injected failure".to_string()));
            }
            self.docs
                .get(match_id)
                .cloned()
                .ok_or(FetchError::NotFound)
        }
    }

    /// A minimal but realistic match-v5 document with two participants.
    pub fn sample_doc(match_id: &str) -> Value {
        json!({
            "metadata": { "matchId": match_id },
            "info": {
                "queueId": 420,
                "gameMode": "CLASSIC",
                "gameEndTimestamp": 1_700_000_000_000u64,
                "gameCreation": 1_699_999_000_000u64,
                "gameDuration": 1843,
                "participants": [
                    {
                        "puuid": "puuid-a",
                        "teamId": 100,
                        "win": true,
                        "role": "SOLO",
                        "teamPosition": "TOP",
                        "lane": "TOP",
                        "championId": 24,
                        "championName": "Jax",
                        "kills": 7,
                        "deaths": 2,
                        "assists": 5,
                        "doubleKills": 1,
                        "goldEarned": 13250,
                        "totalMinionsKilled": 211,
                        "totalTimeDeadSeconds": 48
                    },
                    {
                        "puuid": "puuid-b",
                        "teamId": 200,
                        "win": false,
                        "role": "CARRY",
                        "teamPosition": "BOTTOM",
                        "lane": "BOTTOM",
                        "championId": 51,
                        "championName": "Caitlyn",
                        "kills": 3,
                        "deaths": 6,
                        "assists": 4,
                        "goldEarned": 11020,
                        "totalMinionsKilled": 245,
                        "totalTimeDeadSeconds": 131
                    }
                ]
            }
        })
    }
}
