//! Match store trait for enumerating backfill candidates and persisting
//! partial updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Which backfill population the store should enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillKind {
    /// Matches already hydrated but missing queue id / end timestamp /
    /// duration metadata.
    MissingMetadata,
    /// Matches whose info document has never been fetched.
    Unprocessed,
}

/// A minimal view of a match, enumerated for backfill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStub {
    /// Riot match id (e.g. `"EUW1_1234567890"`).
    pub match_id: String,
    /// Whether the full match document has been ingested.
    pub info_fetched: bool,
}

/// Partial update applied to a match row.
///
/// `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUpdate {
    /// Riot queue id.
    pub queue_id: Option<i32>,
    /// Game mode string (e.g. `"CLASSIC"`).
    pub game_mode: Option<String>,
    /// When the game ended.
    pub game_end_timestamp: Option<DateTime<Utc>>,
    /// Game length in seconds.
    pub duration_seconds: Option<i64>,
    /// Whether to mark the match as fully hydrated.
    pub mark_info_fetched: bool,
}

/// One participant row of a match, inserted idempotently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Match this participant belongs to.
    pub match_id: String,
    /// Riot account puuid.
    pub puuid: String,
    /// Team id (100 or 200).
    pub team_id: i32,
    /// Whether the participant's team won.
    pub win: bool,
    /// Declared role.
    pub role: String,
    /// Assigned team position.
    pub team_position: String,
    /// Lane.
    pub lane: String,
    /// Champion id.
    pub champion_id: i32,
    /// Champion name.
    pub champion_name: String,
    /// Kills.
    pub kills: i32,
    /// Deaths.
    pub deaths: i32,
    /// Assists.
    pub assists: i32,
    /// Double kills.
    pub double_kills: i32,
    /// Triple kills.
    pub triple_kills: i32,
    /// Quadra kills.
    pub quadra_kills: i32,
    /// Penta kills.
    pub penta_kills: i32,
    /// Gold earned.
    pub gold_earned: i32,
    /// Minions killed.
    pub creep_score: i32,
    /// Total seconds spent dead.
    pub time_dead_seconds: i32,
}

/// Store of normalized match records.
///
/// Implemented in `matchhub-database` over PostgreSQL; jobs consume the
/// trait so they can run against an in-memory store in tests.
///
/// `list_needing_backfill` returns a stable, ordered snapshot: a job calls
/// it once, retains the result, and slices batches out of it, so concurrent
/// mutation of the underlying tables cannot change which items later
/// batches enumerate.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Enumerate matches needing work, ordered by match id.
    async fn list_needing_backfill(&self, kind: BackfillKind) -> AppResult<Vec<MatchStub>>;

    /// Apply a partial update to a match row.
    async fn apply_update(&self, match_id: &str, update: &MatchUpdate) -> AppResult<()>;

    /// Insert a participant row unless one already exists for the same
    /// (match, puuid) pair.
    async fn insert_participant_if_absent(&self, record: &ParticipantRecord) -> AppResult<()>;
}
