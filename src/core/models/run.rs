//! Process runs

use super::status::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One invocation of a processor over the pending-work snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRun {
    pub id: i64,
    /// Name of the configured processor
    pub processor: String,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Final aggregate, persisted when the run closes
    pub final_progress: Option<serde_json::Value>,
    pub error: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ProcessRun {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
