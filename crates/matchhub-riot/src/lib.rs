//! # matchhub-riot
//!
//! Riot API integration for MatchHub:
//!
//! - [`RateGate`] — bounded-budget admission for outbound API calls
//! - [`RiotApiClient`] — reqwest-based match-v5 client implementing the
//!   `MatchDataSource` seam trait

pub mod client;
pub mod rate_gate;

pub use client::RiotApiClient;
pub use rate_gate::{GateCancelled, RateGate};
