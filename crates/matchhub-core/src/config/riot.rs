//! Riot API client configuration.

use serde::{Deserialize, Serialize};

/// Riot API client and rate budget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// API key sent in the `X-Riot-Token` header.
    pub api_key: String,
    /// Regional routing base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Maximum outbound calls admitted per rate window.
    #[serde(default = "default_rate_limit_max_calls")]
    pub rate_limit_max_calls: usize,
    /// Length of the rate window in milliseconds.
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,
}

fn default_base_url() -> String {
    "https://europe.api.riotgames.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_rate_limit_max_calls() -> usize {
    20
}

fn default_rate_limit_window_ms() -> u64 {
    1000
}
