//! Job queue configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which queue implementation carries tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    /// In-process channel; tasks die with the process
    #[default]
    Local,
    /// Redis list shared by every worker process
    Redis,
}

/// Job queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub backend: QueueBackend,
    /// Redis list key
    #[serde(default = "default_queue_key")]
    pub key: String,
    /// Tasks executed concurrently by one runner
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deliveries attempted before a task is dropped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Name of this worker. Each worker process sharing a queue needs its
    /// own, so a restarted worker recovers only its own unfinished tasks.
    #[serde(default = "default_consumer")]
    pub consumer: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::default(),
            key: default_queue_key(),
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            consumer: default_consumer(),
        }
    }
}

impl QueueConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
