//! Riot match-v5 API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use matchhub_core::config::riot::RiotConfig;
use matchhub_core::error::AppError;
use matchhub_core::traits::source::{FetchError, MatchDataSource};

use crate::rate_gate::RateGate;

/// HTTP client for the Riot match-v5 API.
///
/// Every call passes through the shared [`RateGate`] before hitting the
/// network, so concurrent jobs share one outbound budget.
#[derive(Debug, Clone)]
pub struct RiotApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    gate: Arc<RateGate>,
}

impl RiotApiClient {
    /// Create a new client from configuration.
    pub fn new(config: &RiotConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build Riot HTTP client: {e}"))
            })?;

        let gate = Arc::new(RateGate::new(
            config.rate_limit_max_calls,
            Duration::from_millis(config.rate_limit_window_ms),
        ));

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            gate,
        })
    }

    /// The shared rate gate guarding this client's outbound budget.
    pub fn rate_gate(&self) -> &Arc<RateGate> {
        &self.gate
    }
}

#[async_trait]
impl MatchDataSource for RiotApiClient {
    async fn fetch_match(
        &self,
        match_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, FetchError> {
        self.gate
            .acquire(cancel)
            .await
            .map_err(|_| FetchError::Cancelled)?;

        let url = format!("{}/lol/match/v5/matches/{}", self.base_url, match_id);
        debug!(match_id, "Fetching match document");

        let response = tokio::select! {
            result = self
                .http
                .get(&url)
                .header("X-Riot-Token", &self.api_key)
                .send() => result,
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(match_id, error = %e, "Riot API transport failure");
                return Err(FetchError::Transient(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| FetchError::Transient(format!("invalid match body: {e}")));
        }

        Err(classify_error_status(status))
    }
}

/// Map a non-success Riot API status to a [`FetchError`].
fn classify_error_status(status: StatusCode) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
        s => FetchError::Transient(format!("unexpected upstream status {s}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_status() {
        assert!(matches!(
            classify_error_status(StatusCode::NOT_FOUND),
            FetchError::NotFound
        ));
        assert!(matches!(
            classify_error_status(StatusCode::TOO_MANY_REQUESTS),
            FetchError::RateLimited
        ));
        assert!(matches!(
            classify_error_status(StatusCode::INTERNAL_SERVER_ERROR),
            FetchError::Transient(_)
        ));
        assert!(matches!(
            classify_error_status(StatusCode::FORBIDDEN),
            FetchError::Transient(_)
        ));
    }
}
