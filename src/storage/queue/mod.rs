//! Job queue: task envelope, backends and the consuming runner
//!
//! Delivery is at-least-once with no ordering. Every handler must tolerate
//! seeing the same task twice. A delivery stays owned by its consumer until
//! acknowledged; a consumer that dies first gets it back through `recover`.

mod local;
mod redis;
mod runner;

pub use local::LocalJobQueue;
pub use self::redis::RedisJobQueue;
pub use runner::TaskRunner;

use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unit of work moved through the queue. Batches carry ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Task {
    Dispatch {
        run_id: i64,
    },
    ProcessBatch {
        run_id: i64,
        batch_index: usize,
        lexeme_ids: Vec<i64>,
    },
    Finalize {
        run_id: i64,
    },
}

impl Task {
    pub fn run_id(&self) -> i64 {
        match self {
            Task::Dispatch { run_id }
            | Task::ProcessBatch { run_id, .. }
            | Task::Finalize { run_id } => *run_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::Dispatch { .. } => "dispatch",
            Task::ProcessBatch { .. } => "process_batch",
            Task::Finalize { .. } => "finalize",
        }
    }
}

/// A task plus delivery bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub id: Uuid,
    pub task: Task,
    /// Zero on first delivery
    pub attempt: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl TaskEnvelope {
    pub fn new(task: Task) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
            attempt: 0,
            enqueued_at: Utc::now(),
        }
    }

    /// Identifies one delivery; a retried envelope is a new delivery
    pub fn delivery(&self) -> (Uuid, u32) {
        (self.id, self.attempt)
    }

    /// The same task, one attempt later
    pub fn retry(mut self) -> Self {
        self.attempt += 1;
        self.enqueued_at = Utc::now();
        self
    }
}

/// Producer side of the queue
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, task: Task) -> Result<()>;
}

/// Consumer side of the queue
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Next envelope, waiting at most `wait`. A zero wait polls once.
    async fn next(&self, wait: Duration) -> Result<Option<TaskEnvelope>>;

    /// Put an envelope back for another attempt
    async fn requeue(&self, envelope: TaskEnvelope) -> Result<()>;

    /// Mark a delivery as finished with, whatever its outcome
    async fn ack(&self, envelope: &TaskEnvelope) -> Result<()>;

    /// Return every unacknowledged delivery of this consumer to the queue
    async fn recover(&self) -> Result<usize>;
}

/// Executes one task
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: &Task) -> Result<()>;
}
