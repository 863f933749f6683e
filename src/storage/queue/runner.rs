//! Bounded-concurrency task consumer

use super::{TaskEnvelope, TaskHandler, TaskSource};
use crate::config::QueueConfig;
use crate::utils::error::{PipelineError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const POLL_WAIT: Duration = Duration::from_secs(1);

/// Pulls envelopes from a source and runs them through a handler.
///
/// Transient failures are requeued after `retry_delay` until `max_attempts`
/// deliveries have been made; anything else is logged and dropped. Every
/// delivery is acknowledged once handled.
#[derive(Clone)]
pub struct TaskRunner {
    source: Arc<dyn TaskSource>,
    handler: Arc<dyn TaskHandler>,
    concurrency: usize,
    max_attempts: u32,
    retry_delay: Duration,
}

impl TaskRunner {
    pub fn new(
        source: Arc<dyn TaskSource>,
        handler: Arc<dyn TaskHandler>,
        config: &QueueConfig,
    ) -> Self {
        Self {
            source,
            handler,
            concurrency: config.concurrency.max(1),
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    /// Drain the queue, including everything handlers enqueue along the way.
    /// Returns the number of deliveries executed.
    pub async fn run_until_idle(&self) -> Result<usize> {
        let mut in_flight = JoinSet::new();
        let mut executed = 0;

        loop {
            while in_flight.len() < self.concurrency {
                match self.source.next(Duration::ZERO).await? {
                    Some(envelope) => {
                        in_flight.spawn(self.clone().execute(envelope));
                    }
                    None => break,
                }
            }

            match in_flight.join_next().await {
                Some(joined) => {
                    joined.map_err(|e| PipelineError::internal(format!("task panicked: {}", e)))?;
                    executed += 1;
                }
                None => break,
            }
        }

        debug!("Queue idle after {} deliveries", executed);
        Ok(executed)
    }

    /// Consume until `shutdown` flips to true, then wait for in-flight tasks.
    /// Deliveries a previous run of this consumer left unacknowledged are
    /// put back first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let recovered = self.source.recover().await?;
        if recovered > 0 {
            warn!("Put back {} tasks left unfinished by an earlier run", recovered);
        }
        info!("Task runner started with concurrency {}", self.concurrency);
        let mut in_flight = JoinSet::new();

        while !*shutdown.borrow() {
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    error!("Task panicked: {}", e);
                }
            }

            if in_flight.len() >= self.concurrency {
                tokio::select! {
                    _ = in_flight.join_next() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                continue;
            }

            match self.source.next(POLL_WAIT).await {
                Ok(Some(envelope)) => {
                    in_flight.spawn(self.clone().execute(envelope));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to read from queue: {}", e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }

        info!("Task runner stopping, waiting for {} tasks", in_flight.len());
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Task panicked: {}", e);
            }
        }
        Ok(())
    }

    async fn execute(self, envelope: TaskEnvelope) {
        let task_name = envelope.task.name();
        let run_id = envelope.task.run_id();
        debug!(
            "Executing {} for run {} (attempt {})",
            task_name,
            run_id,
            envelope.attempt + 1
        );

        if let Err(e) = self.handler.handle(&envelope.task).await {
            self.retry_or_drop(&envelope, e).await;
        }

        // after any requeue, so a crash in between duplicates rather than loses
        if let Err(e) = self.source.ack(&envelope).await {
            warn!("Failed to acknowledge {} for run {}: {}", task_name, run_id, e);
        }
    }

    async fn retry_or_drop(&self, envelope: &TaskEnvelope, e: PipelineError) {
        let task_name = envelope.task.name();
        let run_id = envelope.task.run_id();
        let deliveries = envelope.attempt + 1;
        if e.is_transient() && deliveries < self.max_attempts {
            warn!(
                "{} for run {} failed (attempt {}/{}), retrying: {}",
                task_name, run_id, deliveries, self.max_attempts, e
            );
            tokio::time::sleep(self.retry_delay).await;
            if let Err(requeue_err) = self.source.requeue(envelope.clone().retry()).await {
                error!("Failed to requeue {} for run {}: {}", task_name, run_id, requeue_err);
            }
        } else {
            error!(
                "{} for run {} failed after {} attempt(s): {}",
                task_name, run_id, deliveries, e
            );
        }
    }
}
