//! Pipeline wiring and task routing

use super::keys::{Counter, RunKeys};
use crate::config::PipelineSettings;
use crate::core::models::{ProcessRun, ProgressPayload};
use crate::core::processor::ProcessorRegistry;
use crate::storage::broadcast::Broadcaster;
use crate::storage::counters::CounterStore;
use crate::storage::queue::{JobQueue, Task, TaskHandler};
use crate::storage::repository::WorkItemRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Dispatcher, batch worker, finalizer and progress broadcaster over shared
/// collaborators
#[derive(Clone)]
pub struct Pipeline {
    pub(super) repository: Arc<dyn WorkItemRepository>,
    pub(super) counters: Arc<dyn CounterStore>,
    pub(super) queue: Arc<dyn JobQueue>,
    pub(super) broadcaster: Arc<dyn Broadcaster>,
    pub(super) processors: Arc<ProcessorRegistry>,
    pub(super) settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        repository: Arc<dyn WorkItemRepository>,
        counters: Arc<dyn CounterStore>,
        queue: Arc<dyn JobQueue>,
        broadcaster: Arc<dyn Broadcaster>,
        processors: Arc<ProcessorRegistry>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            repository,
            counters,
            queue,
            broadcaster,
            processors,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Create a pending run for `processor` and queue its dispatch
    pub async fn submit(&self, processor: &str) -> Result<ProcessRun> {
        let run = self.repository.create_run(processor).await?;
        self.queue.enqueue(Task::Dispatch { run_id: run.id }).await?;
        Ok(run)
    }

    /// Current progress of a run.
    ///
    /// Terminal runs report their persisted final payload; live runs report
    /// the counters. `None` when the run is missing or nothing is known yet.
    pub async fn snapshot(&self, run_id: i64) -> Result<Option<ProgressPayload>> {
        let Some(run) = self.repository.get_run(run_id).await? else {
            return Ok(None);
        };

        if run.is_terminal() {
            if let Some(final_progress) = run.final_progress {
                if let Ok(payload) = serde_json::from_value(final_progress) {
                    return Ok(Some(payload));
                }
            }
        }

        let keys = RunKeys::new(run_id);
        let total = self
            .counters
            .read(&keys.counter(Counter::Total))
            .await?;
        if total.is_none() {
            return Ok(None);
        }
        self.read_progress(run_id).await.map(Some)
    }
}

#[async_trait]
impl TaskHandler for Pipeline {
    async fn handle(&self, task: &Task) -> Result<()> {
        match task {
            Task::Dispatch { run_id } => self.dispatch(*run_id).await.map(|_| ()),
            Task::ProcessBatch {
                run_id,
                batch_index,
                lexeme_ids,
            } => self
                .process_batch(*run_id, *batch_index, lexeme_ids)
                .await
                .map(|_| ()),
            Task::Finalize { run_id } => self.finalize(*run_id).await.map(|_| ()),
        }
    }
}
