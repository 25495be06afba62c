//! # matchhub-api
//!
//! HTTP API layer for MatchHub built on Axum.
//!
//! Provides the health endpoints, the administrative backfill triggers,
//! the WebSocket upgrade for sync-progress subscriptions, and the error
//! mapping from domain errors to HTTP responses.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
