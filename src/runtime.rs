//! Wires configuration into live components

use crate::config::{Config, QueueBackend};
use crate::core::patch::PatchEngine;
use crate::core::pipeline::Pipeline;
use crate::core::processor::ProcessorRegistry;
use crate::storage::StorageLayer;
use crate::storage::queue::{JobQueue, LocalJobQueue, RedisJobQueue, TaskRunner, TaskSource};
use crate::utils::error::{PipelineError, Result};
use crate::vcs::GitProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Every long-lived component of a lexflow process
#[derive(Clone)]
pub struct Runtime {
    pub config: Arc<Config>,
    pub storage: StorageLayer,
    pub queue: Arc<dyn JobQueue>,
    pub source: Arc<dyn TaskSource>,
    pub pipeline: Pipeline,
    pub patches: PatchEngine,
}

impl Runtime {
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing lexflow runtime");
        let storage = StorageLayer::new(&config.storage).await?;

        let (queue, source): (Arc<dyn JobQueue>, Arc<dyn TaskSource>) = match config.queue.backend
        {
            QueueBackend::Local => {
                let queue = Arc::new(LocalJobQueue::new());
                (queue.clone(), queue)
            }
            QueueBackend::Redis => {
                let pool = storage.redis.clone().ok_or_else(|| {
                    PipelineError::config("queue backend redis requires storage.redis.enabled")
                })?;
                let queue = Arc::new(RedisJobQueue::new(
                    pool,
                    config.queue.key.clone(),
                    &config.queue.consumer,
                ));
                (queue.clone(), queue)
            }
        };

        let processors = Arc::new(ProcessorRegistry::from_configs(&config.processors));
        info!("Processors available: {}", processors.names().join(", "));

        let pipeline = Pipeline::new(
            storage.database.clone(),
            storage.counters.clone(),
            queue.clone(),
            storage.broadcaster.clone(),
            processors,
            config.pipeline.clone(),
        );
        let patches = PatchEngine::new(
            storage.database.clone(),
            Arc::new(GitProvider::new(config.vcs.clone())),
            storage.counters.clone(),
            &config.vcs,
        );

        Ok(Self {
            config: Arc::new(config),
            storage,
            queue,
            source,
            pipeline,
            patches,
        })
    }

    pub fn runner(&self) -> TaskRunner {
        TaskRunner::new(
            self.source.clone(),
            Arc::new(self.pipeline.clone()),
            &self.config.queue,
        )
    }

    /// Execute queued tasks until the queue is empty
    pub async fn drain(&self) -> Result<usize> {
        self.runner().run_until_idle().await
    }

    /// Consume tasks until `shutdown` flips to true
    pub async fn work(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        self.runner().run(shutdown).await
    }
}
