//! Field extraction from raw match-v5 documents.
//!
//! The Riot API is loose about types in places (queue ids and epoch
//! timestamps arrive as numbers or strings depending on age of the match),
//! so every extractor tolerates both and returns `None` for anything else.

use chrono::{DateTime, Utc};
use serde_json::Value;

use matchhub_core::traits::store::{MatchUpdate, ParticipantRecord};

/// Build the metadata portion of a match update from a raw document.
pub(crate) fn metadata_update(doc: &Value, mark_info_fetched: bool) -> MatchUpdate {
    MatchUpdate {
        queue_id: extract_queue_id(doc),
        game_mode: extract_game_mode(doc),
        game_end_timestamp: extract_game_end_timestamp(doc),
        duration_seconds: extract_duration_seconds(doc),
        mark_info_fetched,
    }
}

pub(crate) fn extract_queue_id(doc: &Value) -> Option<i32> {
    match doc.get("info")?.get("queueId")? {
        Value::Number(n) => n.as_i64().map(|v| v as i32),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub(crate) fn extract_game_mode(doc: &Value) -> Option<String> {
    doc.get("info")?
        .get("gameMode")?
        .as_str()
        .map(String::from)
}

/// End-of-game timestamp in epoch milliseconds, falling back to
/// `gameCreation` for old matches that predate `gameEndTimestamp`.
pub(crate) fn extract_game_end_timestamp(doc: &Value) -> Option<DateTime<Utc>> {
    let info = doc.get("info")?;
    let end_ms =
        epoch_millis(info, "gameEndTimestamp").or_else(|| epoch_millis(info, "gameCreation"))?;
    if end_ms <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(end_ms)
}

pub(crate) fn extract_duration_seconds(doc: &Value) -> Option<i64> {
    doc.get("info")?.get("gameDuration")?.as_i64()
}

/// All participant rows of a match document.
pub(crate) fn extract_participants(doc: &Value, match_id: &str) -> Vec<ParticipantRecord> {
    let Some(list) = doc
        .get("info")
        .and_then(|info| info.get("participants"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    list.iter()
        .map(|p| ParticipantRecord {
            match_id: match_id.to_string(),
            puuid: str_field(p, "puuid"),
            team_id: int_field(p, "teamId"),
            win: p.get("win").and_then(Value::as_bool).unwrap_or(false),
            role: str_field(p, "role"),
            team_position: str_field(p, "teamPosition"),
            lane: str_field(p, "lane"),
            champion_id: int_field(p, "championId"),
            champion_name: str_field(p, "championName"),
            kills: int_field(p, "kills"),
            deaths: int_field(p, "deaths"),
            assists: int_field(p, "assists"),
            double_kills: int_field(p, "doubleKills"),
            triple_kills: int_field(p, "tripleKills"),
            quadra_kills: int_field(p, "quadraKills"),
            penta_kills: int_field(p, "pentaKills"),
            gold_earned: int_field(p, "goldEarned"),
            creep_score: int_field(p, "totalMinionsKilled"),
            time_dead_seconds: int_field(p, "totalTimeDeadSeconds"),
        })
        .collect()
}

fn epoch_millis(obj: &Value, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn str_field(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn int_field(obj: &Value, key: &str) -> i32 {
    obj.get(key)
        .and_then(Value::as_i64)
        .map(|v| v as i32)
        .unwrap_or(0)
}
