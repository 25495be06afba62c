//! Match participant repository implementation.

use sqlx::PgPool;

use matchhub_core::error::{AppError, ErrorKind};
use matchhub_core::result::AppResult;
use matchhub_core::traits::store::ParticipantRecord;

/// Repository for match participant rows.
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    /// Create a new participant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a participant unless one already exists for the same
    /// (match, puuid) pair. Returns `true` if a row was inserted.
    pub async fn insert_if_absent(&self, record: &ParticipantRecord) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO lol_match_participants \
             (match_id, puuid, team_id, win, role, team_position, lane, \
              champion_id, champion_name, kills, deaths, assists, \
              double_kills, triple_kills, quadra_kills, penta_kills, \
              gold_earned, creep_score, time_dead_seconds) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                     $13, $14, $15, $16, $17, $18, $19) \
             ON CONFLICT (match_id, puuid) DO NOTHING",
        )
        .bind(&record.match_id)
        .bind(&record.puuid)
        .bind(record.team_id)
        .bind(record.win)
        .bind(&record.role)
        .bind(&record.team_position)
        .bind(&record.lane)
        .bind(record.champion_id)
        .bind(&record.champion_name)
        .bind(record.kills)
        .bind(record.deaths)
        .bind(record.assists)
        .bind(record.double_kills)
        .bind(record.triple_kills)
        .bind(record.quadra_kills)
        .bind(record.penta_kills)
        .bind(record.gold_earned)
        .bind(record.creep_score)
        .bind(record.time_dead_seconds)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert participant", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Count participants stored for a match.
    pub async fn count_for_match(&self, match_id: &str) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM lol_match_participants WHERE match_id = $1")
            .bind(match_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count participants", e)
            })
    }
}
