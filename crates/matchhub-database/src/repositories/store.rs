//! PostgreSQL-backed implementation of the `MatchStore` seam trait.

use async_trait::async_trait;

use matchhub_core::result::AppResult;
use matchhub_core::traits::store::{
    BackfillKind, MatchStore, MatchStub, MatchUpdate, ParticipantRecord,
};

use super::lol_match::MatchRepository;
use super::participant::ParticipantRepository;

/// Facade combining the match and participant repositories into the
/// [`MatchStore`] interface consumed by the sync jobs.
#[derive(Debug, Clone)]
pub struct PgMatchStore {
    matches: MatchRepository,
    participants: ParticipantRepository,
}

impl PgMatchStore {
    /// Create a new store facade over the two repositories.
    pub fn new(matches: MatchRepository, participants: ParticipantRepository) -> Self {
        Self {
            matches,
            participants,
        }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn list_needing_backfill(&self, kind: BackfillKind) -> AppResult<Vec<MatchStub>> {
        self.matches.list_needing_backfill(kind).await
    }

    async fn apply_update(&self, match_id: &str, update: &MatchUpdate) -> AppResult<()> {
        self.matches.apply_update(match_id, update).await
    }

    async fn insert_participant_if_absent(&self, record: &ParticipantRecord) -> AppResult<()> {
        self.participants.insert_if_absent(record).await.map(|_| ())
    }
}
