//! Version control configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Git client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Path or name of the git executable
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    /// Commit author name; falls back to the repository's git config
    #[serde(default)]
    pub author_name: Option<String>,
    /// Commit author email; falls back to the repository's git config
    #[serde(default)]
    pub author_email: Option<String>,
    /// Expiry of the per-file patch lock in seconds
    #[serde(default = "default_file_lock_ttl")]
    pub file_lock_ttl_secs: u64,
    /// How long an apply waits for a busy file before giving up
    #[serde(default = "default_file_lock_wait_ms")]
    pub file_lock_wait_ms: u64,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            author_name: None,
            author_email: None,
            file_lock_ttl_secs: default_file_lock_ttl(),
            file_lock_wait_ms: default_file_lock_wait_ms(),
        }
    }
}

impl VcsConfig {
    pub fn file_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.file_lock_ttl_secs)
    }

    pub fn file_lock_wait(&self) -> Duration {
        Duration::from_millis(self.file_lock_wait_ms)
    }
}
