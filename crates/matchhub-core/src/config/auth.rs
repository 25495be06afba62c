//! Token validation configuration.

use serde::{Deserialize, Serialize};

/// Bearer token validation settings.
///
/// MatchHub does not issue tokens; it only validates tokens minted by the
/// surrounding platform, so the secret is the only mandatory field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to validate incoming JWTs.
    pub jwt_secret: String,
    /// Accepted clock skew in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_leeway() -> u64 {
    30
}
