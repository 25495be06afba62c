//! Batch synchronization configuration.

use serde::{Deserialize, Serialize};

/// Batch job engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of items processed per batch.
    #[serde(default = "default_batch_size")]
    pub default_batch_size: usize,
    /// Pause between consecutive batches in milliseconds.
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay(),
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_delay() -> u64 {
    500
}
