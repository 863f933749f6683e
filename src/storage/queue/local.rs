//! In-process queue

use super::{JobQueue, Task, TaskEnvelope, TaskSource};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// Unbounded in-process queue for single-process runs and tests
#[derive(Debug)]
pub struct LocalJobQueue {
    sender: mpsc::UnboundedSender<TaskEnvelope>,
    receiver: Mutex<mpsc::UnboundedReceiver<TaskEnvelope>>,
    pending: AtomicUsize,
    unacked: parking_lot::Mutex<HashMap<(Uuid, u32), TaskEnvelope>>,
}

impl LocalJobQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            pending: AtomicUsize::new(0),
            unacked: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Envelopes waiting to be taken
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn push(&self, envelope: TaskEnvelope) -> Result<()> {
        self.sender
            .send(envelope)
            .map_err(|_| PipelineError::queue("local queue is closed"))?;
        self.pending.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Deliveries taken and not yet acknowledged
    pub fn unacked(&self) -> usize {
        self.unacked.lock().len()
    }

    fn taken(&self, envelope: Option<TaskEnvelope>) -> Option<TaskEnvelope> {
        if let Some(envelope) = &envelope {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            self.unacked
                .lock()
                .insert(envelope.delivery(), envelope.clone());
        }
        envelope
    }
}

impl Default for LocalJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn enqueue(&self, task: Task) -> Result<()> {
        self.push(TaskEnvelope::new(task))
    }
}

#[async_trait]
impl TaskSource for LocalJobQueue {
    async fn next(&self, wait: Duration) -> Result<Option<TaskEnvelope>> {
        let mut receiver = self.receiver.lock().await;
        let envelope = if wait.is_zero() {
            receiver.try_recv().ok()
        } else {
            tokio::time::timeout(wait, receiver.recv())
                .await
                .ok()
                .flatten()
        };
        Ok(self.taken(envelope))
    }

    async fn requeue(&self, envelope: TaskEnvelope) -> Result<()> {
        self.push(envelope)
    }

    async fn ack(&self, envelope: &TaskEnvelope) -> Result<()> {
        self.unacked.lock().remove(&envelope.delivery());
        Ok(())
    }

    async fn recover(&self) -> Result<usize> {
        let leftovers: Vec<TaskEnvelope> = self.unacked.lock().drain().map(|(_, envelope)| envelope).collect();
        let recovered = leftovers.len();
        for envelope in leftovers {
            self.push(envelope)?;
        }
        Ok(recovered)
    }
}
