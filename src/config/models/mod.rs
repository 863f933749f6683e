//! Configuration data models
//!
//! This module defines all configuration structures used throughout the pipeline.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod queue;
pub mod storage;
pub mod vcs;

// Re-export all configuration types
pub use logging::*;
pub use pipeline::*;
pub use processor::*;
pub use queue::*;
pub use storage::*;
pub use vcs::*;

/// Default token budget for one batch
pub fn default_max_tokens_per_batch() -> usize {
    2_000
}

/// Default page size when scanning pending lexemes
pub fn default_page_size() -> u64 {
    500
}

/// Default counter expiry in seconds
pub fn default_counter_ttl() -> u64 {
    6 * 3600 // 6 hours
}

/// Default finalize lock expiry in seconds
pub fn default_finalize_lock_ttl() -> u64 {
    30
}

/// Default per-file patch lock expiry in seconds
pub fn default_file_lock_ttl() -> u64 {
    60
}

/// Default wait for a busy file in milliseconds
pub fn default_file_lock_wait_ms() -> u64 {
    10_000
}

/// Default progress broadcast window in milliseconds
pub fn default_progress_throttle_ms() -> u64 {
    500
}

/// Default maximum database connections
pub fn default_max_connections() -> u32 {
    10
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default worker concurrency
pub fn default_concurrency() -> usize {
    4
}

/// Default maximum delivery attempts per task
pub fn default_max_attempts() -> u32 {
    3
}

/// Default delay before a task is re-enqueued, in milliseconds
pub fn default_retry_delay_ms() -> u64 {
    1_000
}

/// Default worker name on the queue
pub fn default_consumer() -> String {
    "worker".to_string()
}

/// Default queue key
pub fn default_queue_key() -> String {
    "lexflow:tasks".to_string()
}

/// Default git binary
pub fn default_git_binary() -> String {
    "git".to_string()
}

/// Default log filter
pub fn default_log_level() -> String {
    "info".to_string()
}
