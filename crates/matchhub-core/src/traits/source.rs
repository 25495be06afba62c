//! Match data source trait for fetching raw match documents.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use serde_json::Value;

/// Error returned by [`MatchDataSource::fetch_match`].
///
/// `NotFound` and `RateLimited` carry enough signal for a job to decide
/// whether an item is worth retrying on a later run; everything else from
/// the upstream (5xx, transport failures, malformed bodies) is `Transient`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The match id does not exist upstream.
    #[error("match not found upstream")]
    NotFound,
    /// The upstream rejected the call with a rate-limit response.
    ///
    /// Backing off and retrying the individual call is the caller's
    /// responsibility, not the rate gate's.
    #[error("rate limited by upstream API")]
    RateLimited,
    /// A retryable upstream or transport failure.
    #[error("transient upstream failure: {0}")]
    Transient(String),
    /// The cancellation token fired before the call was admitted.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Source of raw match documents, keyed by match id.
///
/// The trait is defined here in `matchhub-core` and implemented in
/// `matchhub-riot`; jobs consume it so they can be exercised against an
/// in-memory source in tests.
#[async_trait]
pub trait MatchDataSource: Send + Sync {
    /// Fetch the raw match document for `match_id`.
    async fn fetch_match(&self, match_id: &str, cancel: &CancellationToken)
    -> Result<Value, FetchError>;
}
