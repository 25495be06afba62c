//! Inbound and outbound sync-progress wire frame definitions.

use serde::{Deserialize, Serialize};

/// Control frames sent by the client to the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Start receiving sync updates for an account.
    Subscribe {
        /// Riot account puuid.
        puuid: String,
    },
    /// Stop receiving sync updates for an account.
    Unsubscribe {
        /// Riot account puuid.
        puuid: String,
    },
}

/// Messages pushed by the hub to subscribed clients.
///
/// The `status` field doubles as the tag; the rest of each variant matches
/// the client contract:
///
/// ```json
/// {"puuid":"...","status":"syncing","progress":3,"total":20,"matchId":"EUW1_1"}
/// {"puuid":"...","status":"completed","totalSynced":20}
/// {"puuid":"...","status":"failed","error":"..."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SyncMessage {
    /// A sync run is in flight.
    #[serde(rename = "syncing", rename_all = "camelCase")]
    Progress {
        /// Account being synchronized.
        puuid: String,
        /// Items completed so far.
        progress: usize,
        /// Total items in the run.
        total: usize,
        /// Match currently being processed, if any.
        match_id: Option<String>,
    },
    /// A sync run finished.
    #[serde(rename = "completed", rename_all = "camelCase")]
    Complete {
        /// Account that was synchronized.
        puuid: String,
        /// Total items synchronized by the run.
        total_synced: usize,
    },
    /// A sync run failed.
    #[serde(rename = "failed")]
    Error {
        /// Account whose sync failed.
        puuid: String,
        /// Failure description.
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_frame_wire_format() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"subscribe","puuid":"abc-123"}"#).unwrap();
        assert!(matches!(frame, ClientFrame::Subscribe { ref puuid } if puuid == "abc-123"));

        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"unsubscribe","puuid":"abc-123"}"#).unwrap();
        assert!(matches!(frame, ClientFrame::Unsubscribe { ref puuid } if puuid == "abc-123"));

        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"ping"}"#).is_err());
    }

    #[test]
    fn test_progress_wire_format() {
        let message = SyncMessage::Progress {
            puuid: "abc".to_string(),
            progress: 3,
            total: 20,
            match_id: Some("EUW1_1".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "puuid": "abc",
                "status": "syncing",
                "progress": 3,
                "total": 20,
                "matchId": "EUW1_1",
            })
        );
    }

    #[test]
    fn test_progress_without_match_id_serializes_null() {
        let message = SyncMessage::Progress {
            puuid: "abc".to_string(),
            progress: 1,
            total: 2,
            match_id: None,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("matchId").unwrap().is_null());
    }

    #[test]
    fn test_complete_wire_format() {
        let message = SyncMessage::Complete {
            puuid: "abc".to_string(),
            total_synced: 20,
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "puuid": "abc",
                "status": "completed",
                "totalSynced": 20,
            })
        );
    }

    #[test]
    fn test_error_wire_format() {
        let message = SyncMessage::Error {
            puuid: "abc".to_string(),
            error: "riot api unavailable".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "puuid": "abc",
                "status": "failed",
                "error": "riot api unavailable",
            })
        );
    }
}
