//! Pipeline tuning configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Estimated token budget for one batch
    #[serde(default = "default_max_tokens_per_batch")]
    pub max_tokens_per_batch: usize,
    /// Page size used when loading pending lexemes
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Expiry of progress counters, in seconds
    #[serde(default = "default_counter_ttl")]
    pub counter_ttl_secs: u64,
    /// Expiry of the finalize lock, in seconds
    #[serde(default = "default_finalize_lock_ttl")]
    pub finalize_lock_ttl_secs: u64,
    /// Minimum interval between two progress broadcasts of one run
    #[serde(default = "default_progress_throttle_ms")]
    pub progress_throttle_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_tokens_per_batch: default_max_tokens_per_batch(),
            page_size: default_page_size(),
            counter_ttl_secs: default_counter_ttl(),
            finalize_lock_ttl_secs: default_finalize_lock_ttl(),
            progress_throttle_ms: default_progress_throttle_ms(),
        }
    }
}

impl PipelineSettings {
    pub fn counter_ttl(&self) -> Duration {
        Duration::from_secs(self.counter_ttl_secs)
    }

    pub fn finalize_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.finalize_lock_ttl_secs)
    }

    pub fn progress_throttle(&self) -> Duration {
        Duration::from_millis(self.progress_throttle_ms)
    }
}
