//! Sync-progress hub — connection registry, subscription index, fan-out.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use matchhub_core::config::realtime::RealtimeConfig;
use matchhub_core::types::id::UserId;

use crate::message::{ClientFrame, SyncMessage};

/// Unique connection identifier, valid for the process lifetime.
pub type ConnectionId = Uuid;

/// Lifecycle of a registered connection.
///
/// `Connecting` happens before registration (socket upgrade) and `Closed`
/// after removal, so only the two live states are tracked here. Subscribe
/// frames are honored in `Open` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Open,
    Closing,
}

/// Hub-owned state of one client connection.
#[derive(Debug)]
struct ConnectionEntry {
    /// Authenticated owner, kept for log correlation.
    user_id: UserId,
    /// Outbound buffer feeding the connection's single writer task.
    sender: mpsc::Sender<String>,
    /// Subjects this connection is subscribed to.
    subjects: HashSet<String>,
    state: ConnState,
}

/// Connection registry and subject subscription index.
///
/// Both maps live under one mutex so every mutation is transactional:
/// `conn ∈ subscriptions[subject]` if and only if
/// `subject ∈ connections[conn].subjects`, and no reader can observe a
/// subscriber set mid-update. Critical sections only touch the maps —
/// all I/O (serialization aside) happens outside the lock.
#[derive(Debug, Default)]
struct HubState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    subscriptions: HashMap<String, HashSet<ConnectionId>>,
}

/// Broadcasts sync progress to WebSocket subscribers.
///
/// The hub is socket-agnostic: the API layer registers a connection, drains
/// the returned receiver into the socket from a single writer task (which
/// serializes all sends to that client), feeds inbound text frames to
/// [`handle_frame`](Self::handle_frame), and unregisters on any exit path.
///
/// Delivery is best-effort: a connection whose buffer is full drops that
/// message; nothing blocks delivery to the remaining subscribers.
#[derive(Debug)]
pub struct SyncProgressHub {
    state: Mutex<HubState>,
    config: RealtimeConfig,
}

impl SyncProgressHub {
    /// Create an empty hub.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            config,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, HubState> {
        // A poisoned mutex only means some holder panicked mid-section;
        // the maps themselves remain structurally sound, so recover the
        // guard instead of propagating the panic to every broadcaster.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new connection for `user_id`, entering the Open state.
    ///
    /// Returns the connection id and the receiver the caller's writer task
    /// must drain into the socket.
    pub fn register(&self, user_id: UserId) -> (ConnectionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let conn_id = Uuid::new_v4();

        let mut state = self.lock_state();
        state.connections.insert(
            conn_id,
            ConnectionEntry {
                user_id,
                sender: tx,
                subjects: HashSet::new(),
                state: ConnState::Open,
            },
        );
        drop(state);

        debug!(conn_id = %conn_id, user_id = %user_id, "Sync connection registered");
        (conn_id, rx)
    }

    /// Process an inbound control frame.
    ///
    /// Malformed frames and unknown types are logged and ignored; they are
    /// never fatal to the connection.
    pub fn handle_frame(&self, conn_id: &ConnectionId, raw: &str) {
        let frame: ClientFrame = match serde_json::from_str(raw) {
            Ok(f) => f,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Ignoring unparseable control frame");
                return;
            }
        };

        match frame {
            ClientFrame::Subscribe { puuid } => self.subscribe(conn_id, puuid),
            ClientFrame::Unsubscribe { puuid } => self.unsubscribe(conn_id, &puuid),
        }
    }

    /// Subscribe a connection to a subject. Ignored unless the connection
    /// is Open, the subject is non-empty, and the connection is under its
    /// subscription cap.
    fn subscribe(&self, conn_id: &ConnectionId, puuid: String) {
        if puuid.is_empty() {
            warn!(conn_id = %conn_id, "Ignoring subscribe with empty puuid");
            return;
        }

        let mut state = self.lock_state();
        let Some(entry) = state.connections.get_mut(conn_id) else {
            warn!(conn_id = %conn_id, "Subscribe from unknown connection");
            return;
        };

        if entry.state != ConnState::Open {
            debug!(conn_id = %conn_id, "Ignoring subscribe on closing connection");
            return;
        }

        if entry.subjects.len() >= self.config.max_subscriptions_per_connection
            && !entry.subjects.contains(&puuid)
        {
            warn!(
                conn_id = %conn_id,
                max = self.config.max_subscriptions_per_connection,
                "Subscription cap reached, ignoring subscribe"
            );
            return;
        }

        entry.subjects.insert(puuid.clone());
        state
            .subscriptions
            .entry(puuid.clone())
            .or_default()
            .insert(*conn_id);
        drop(state);

        debug!(conn_id = %conn_id, puuid = %puuid, "Subscribed to account");
    }

    /// Unsubscribe a connection from a subject.
    fn unsubscribe(&self, conn_id: &ConnectionId, puuid: &str) {
        let mut state = self.lock_state();
        if let Some(entry) = state.connections.get_mut(conn_id) {
            entry.subjects.remove(puuid);
        }
        let now_empty = state
            .subscriptions
            .get_mut(puuid)
            .map(|subscribers| {
                subscribers.remove(conn_id);
                subscribers.is_empty()
            })
            .unwrap_or(false);
        if now_empty {
            state.subscriptions.remove(puuid);
        }
        drop(state);

        debug!(conn_id = %conn_id, puuid = %puuid, "Unsubscribed from account");
    }

    /// Move a connection from Open to Closing; later subscribes are
    /// silently ignored while the socket drains.
    pub fn begin_close(&self, conn_id: &ConnectionId) {
        let mut state = self.lock_state();
        if let Some(entry) = state.connections.get_mut(conn_id) {
            entry.state = ConnState::Closing;
        }
    }

    /// Remove a connection from the registry and from every subject's
    /// subscriber set.
    ///
    /// Called on every read-loop exit path — client close, protocol error,
    /// or cancellation — so a vanished connection never lingers in the
    /// index.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        let mut state = self.lock_state();
        let Some(entry) = state.connections.remove(conn_id) else {
            return;
        };
        for subject in &entry.subjects {
            let now_empty = state
                .subscriptions
                .get_mut(subject)
                .map(|subscribers| {
                    subscribers.remove(conn_id);
                    subscribers.is_empty()
                })
                .unwrap_or(false);
            if now_empty {
                state.subscriptions.remove(subject);
            }
        }
        drop(state);

        debug!(conn_id = %conn_id, user_id = %entry.user_id, "Sync connection unregistered");
    }

    /// Broadcast an in-flight progress update for `puuid`.
    pub fn broadcast_progress(
        &self,
        puuid: &str,
        progress: usize,
        total: usize,
        current_match_id: Option<&str>,
    ) {
        self.broadcast(
            puuid,
            &SyncMessage::Progress {
                puuid: puuid.to_string(),
                progress,
                total,
                match_id: current_match_id.map(String::from),
            },
        );
    }

    /// Broadcast sync completion for `puuid`.
    pub fn broadcast_complete(&self, puuid: &str, total_synced: usize) {
        self.broadcast(
            puuid,
            &SyncMessage::Complete {
                puuid: puuid.to_string(),
                total_synced,
            },
        );
    }

    /// Broadcast a sync failure for `puuid`.
    pub fn broadcast_error(&self, puuid: &str, error: &str) {
        self.broadcast(
            puuid,
            &SyncMessage::Error {
                puuid: puuid.to_string(),
                error: error.to_string(),
            },
        );
    }

    /// Serialize once and deliver to every current subscriber of `subject`.
    ///
    /// The subscriber snapshot is taken under the lock; the actual sends
    /// happen outside it via `try_send`, so one slow or dead connection
    /// cannot block the others or the broadcaster.
    fn broadcast(&self, subject: &str, message: &SyncMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to serialize sync message");
                return;
            }
        };

        let targets: Vec<(ConnectionId, mpsc::Sender<String>)> = {
            let state = self.lock_state();
            let Some(subscribers) = state.subscriptions.get(subject) else {
                return;
            };
            subscribers
                .iter()
                .filter_map(|conn_id| {
                    state
                        .connections
                        .get(conn_id)
                        .map(|entry| (*conn_id, entry.sender.clone()))
                })
                .collect()
        };

        for (conn_id, sender) in targets {
            match sender.try_send(payload.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(conn_id = %conn_id, "Connection buffer full, dropping sync message");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Writer task is gone; disconnect cleanup will remove
                    // the entry shortly.
                    debug!(conn_id = %conn_id, "Dropping sync message for closed connection");
                }
            }
        }
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.lock_state().connections.len()
    }

    /// Number of connections currently subscribed to `subject`.
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.lock_state()
            .subscriptions
            .get(subject)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hub() -> SyncProgressHub {
        SyncProgressHub::new(RealtimeConfig::default())
    }

    fn subscribe(hub: &SyncProgressHub, conn_id: &ConnectionId, puuid: &str) {
        hub.handle_frame(
            conn_id,
            &format!(r#"{{"type":"subscribe","puuid":"{puuid}"}}"#),
        );
    }

    #[tokio::test]
    async fn test_fan_out_reaches_every_subscriber_exactly_once() {
        let hub = test_hub();
        let (conn_a, mut rx_a) = hub.register(UserId::new());
        let (conn_b, mut rx_b) = hub.register(UserId::new());
        let (conn_c, mut rx_c) = hub.register(UserId::new());

        subscribe(&hub, &conn_a, "X");
        subscribe(&hub, &conn_b, "X");
        subscribe(&hub, &conn_c, "Y");

        hub.broadcast_progress("X", 1, 5, Some("EUW1_1"));

        let got_a = rx_a.try_recv().unwrap();
        let got_b = rx_b.try_recv().unwrap();
        assert_eq!(got_a, got_b);
        assert!(got_a.contains(r#""status":"syncing""#));

        assert!(rx_a.try_recv().is_err(), "exactly one message per subscriber");
        assert!(rx_c.try_recv().is_err(), "subject Y must not receive X traffic");
    }

    #[tokio::test]
    async fn test_messages_arrive_in_send_order() {
        let hub = test_hub();
        let (conn, mut rx) = hub.register(UserId::new());
        subscribe(&hub, &conn, "X");

        hub.broadcast_progress("X", 1, 3, None);
        hub.broadcast_progress("X", 2, 3, None);
        hub.broadcast_complete("X", 3);

        assert!(rx.try_recv().unwrap().contains(r#""progress":1"#));
        assert!(rx.try_recv().unwrap().contains(r#""progress":2"#));
        assert!(rx.try_recv().unwrap().contains(r#""status":"completed""#));
    }

    #[tokio::test]
    async fn test_unregister_cleans_every_subscription() {
        let hub = test_hub();
        let (conn, mut rx) = hub.register(UserId::new());
        subscribe(&hub, &conn, "X");
        subscribe(&hub, &conn, "Y");
        assert_eq!(hub.subscriber_count("X"), 1);

        hub.unregister(&conn);

        assert_eq!(hub.connection_count(), 0);
        assert_eq!(hub.subscriber_count("X"), 0);
        assert_eq!(hub.subscriber_count("Y"), 0);

        // Broadcasting to a subject the connection used to watch neither
        // panics nor delivers.
        hub.broadcast_error("X", "boom");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let hub = test_hub();
        let (conn, mut rx) = hub.register(UserId::new());
        subscribe(&hub, &conn, "X");
        hub.handle_frame(&conn, r#"{"type":"unsubscribe","puuid":"X"}"#);

        hub.broadcast_progress("X", 1, 1, None);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_frames_are_ignored() {
        let hub = test_hub();
        let (conn, _rx) = hub.register(UserId::new());

        hub.handle_frame(&conn, r#"{"type":"ping"}"#);
        hub.handle_frame(&conn, "not json at all");
        hub.handle_frame(&conn, r#"{"type":"subscribe"}"#);

        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.subscriber_count("X"), 0);
    }

    #[tokio::test]
    async fn test_subscribe_ignored_once_closing() {
        let hub = test_hub();
        let (conn, _rx) = hub.register(UserId::new());

        hub.begin_close(&conn);
        subscribe(&hub, &conn, "X");

        assert_eq!(hub.subscriber_count("X"), 0);
    }

    #[tokio::test]
    async fn test_subscription_cap_enforced() {
        let hub = SyncProgressHub::new(RealtimeConfig {
            channel_buffer_size: 8,
            max_subscriptions_per_connection: 2,
        });
        let (conn, _rx) = hub.register(UserId::new());

        subscribe(&hub, &conn, "A");
        subscribe(&hub, &conn, "B");
        subscribe(&hub, &conn, "C");

        assert_eq!(hub.subscriber_count("A"), 1);
        assert_eq!(hub.subscriber_count("B"), 1);
        assert_eq!(hub.subscriber_count("C"), 0);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_message_without_blocking() {
        let hub = SyncProgressHub::new(RealtimeConfig {
            channel_buffer_size: 1,
            max_subscriptions_per_connection: 8,
        });
        let (slow, mut slow_rx) = hub.register(UserId::new());
        let (fast, mut fast_rx) = hub.register(UserId::new());
        subscribe(&hub, &slow, "X");
        subscribe(&hub, &fast, "X");

        // Fill the slow connection's one-slot buffer; the fast connection
        // drains its copy immediately.
        hub.broadcast_progress("X", 1, 2, None);
        assert!(fast_rx.try_recv().unwrap().contains(r#""progress":1"#));

        // Second message is dropped for the slow connection but still
        // reaches the fast one.
        hub.broadcast_progress("X", 2, 2, None);
        assert!(fast_rx.try_recv().unwrap().contains(r#""progress":2"#));

        assert!(slow_rx.try_recv().unwrap().contains(r#""progress":1"#));
        assert!(slow_rx.try_recv().is_err());
    }
}
