//! # matchhub-realtime
//!
//! Real-time sync-progress engine for MatchHub:
//!
//! - Connection registry with per-connection outbound buffers
//! - Subject (puuid) keyed subscription index
//! - Best-effort message fan-out to current subscribers
//!
//! The hub is socket-agnostic: the API layer owns the WebSocket I/O and
//! drives the hub through `register` / `handle_frame` / `unregister`.

pub mod hub;
pub mod message;

pub use hub::{ConnectionId, SyncProgressHub};
pub use message::{ClientFrame, SyncMessage};
