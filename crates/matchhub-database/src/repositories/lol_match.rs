//! Match repository implementation.

use sqlx::PgPool;

use matchhub_core::error::{AppError, ErrorKind};
use matchhub_core::result::AppResult;
use matchhub_core::traits::store::{BackfillKind, MatchStub, MatchUpdate};
use matchhub_entity::lol_match::model::LolMatch;

/// Repository for match rows and backfill enumeration.
#[derive(Debug, Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    /// Create a new match repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a match by its Riot id.
    pub async fn find_by_id(&self, match_id: &str) -> AppResult<Option<LolMatch>> {
        sqlx::query_as::<_, LolMatch>("SELECT * FROM lol_matches WHERE match_id = $1")
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find match", e))
    }

    /// Count matches still waiting for hydration.
    pub async fn count_unprocessed(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM lol_matches WHERE info_fetched = FALSE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count unprocessed matches", e)
            })
    }

    /// Enumerate matches needing backfill work, ordered by match id.
    ///
    /// The ordering makes the result a stable snapshot for batch slicing:
    /// rows hydrated between two calls disappear from the *next* run, not
    /// from the one already holding the list.
    pub async fn list_needing_backfill(&self, kind: BackfillKind) -> AppResult<Vec<MatchStub>> {
        let query = match kind {
            BackfillKind::MissingMetadata => {
                "SELECT match_id, info_fetched FROM lol_matches \
                 WHERE info_fetched = TRUE \
                 AND (queue_id IS NULL OR game_end_timestamp IS NULL OR duration_seconds IS NULL) \
                 ORDER BY match_id"
            }
            BackfillKind::Unprocessed => {
                "SELECT match_id, info_fetched FROM lol_matches \
                 WHERE info_fetched = FALSE \
                 ORDER BY match_id"
            }
        };

        let rows = sqlx::query_as::<_, (String, bool)>(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list backfill candidates", e)
            })?;

        Ok(rows
            .into_iter()
            .map(|(match_id, info_fetched)| MatchStub {
                match_id,
                info_fetched,
            })
            .collect())
    }

    /// Apply a partial metadata update to a match row.
    ///
    /// `None` fields keep their current value (COALESCE); `mark_info_fetched`
    /// flips the hydration flag.
    pub async fn apply_update(&self, match_id: &str, update: &MatchUpdate) -> AppResult<()> {
        sqlx::query(
            "UPDATE lol_matches SET \
             queue_id = COALESCE($2, queue_id), \
             game_mode = COALESCE($3, game_mode), \
             game_end_timestamp = COALESCE($4, game_end_timestamp), \
             duration_seconds = COALESCE($5, duration_seconds), \
             info_fetched = info_fetched OR $6 \
             WHERE match_id = $1",
        )
        .bind(match_id)
        .bind(update.queue_id)
        .bind(&update.game_mode)
        .bind(update.game_end_timestamp)
        .bind(update.duration_seconds)
        .bind(update.mark_info_fetched)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update match", e))?;

        Ok(())
    }
}
