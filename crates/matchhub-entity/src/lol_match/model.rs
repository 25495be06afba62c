//! League match entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An ingested League match.
///
/// Rows are created when a match id is first discovered; the metadata
/// columns stay `NULL` until a backfill or hydration job fetches the full
/// match document (`info_fetched` flips to `true` at that point).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LolMatch {
    /// Riot match id (e.g. `"EUW1_1234567890"`). Primary key.
    pub match_id: String,
    /// Riot queue id (e.g. 420 = ranked solo).
    pub queue_id: Option<i32>,
    /// Game mode string (e.g. `"CLASSIC"`).
    pub game_mode: Option<String>,
    /// When the game ended.
    pub game_end_timestamp: Option<DateTime<Utc>>,
    /// Game length in seconds.
    pub duration_seconds: Option<i64>,
    /// Whether the full match document has been ingested.
    pub info_fetched: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl LolMatch {
    /// Whether the row is hydrated but still missing metadata columns.
    pub fn needs_metadata_backfill(&self) -> bool {
        self.info_fetched
            && (self.queue_id.is_none()
                || self.game_end_timestamp.is_none()
                || self.duration_seconds.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_row(info_fetched: bool, queue_id: Option<i32>) -> LolMatch {
        LolMatch {
            match_id: "EUW1_1".to_string(),
            queue_id,
            game_mode: Some("CLASSIC".to_string()),
            game_end_timestamp: Some(Utc::now()),
            duration_seconds: Some(1800),
            info_fetched,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_needs_metadata_backfill() {
        assert!(match_row(true, None).needs_metadata_backfill());
        assert!(!match_row(true, Some(420)).needs_metadata_backfill());
        assert!(!match_row(false, None).needs_metadata_backfill());
    }
}
