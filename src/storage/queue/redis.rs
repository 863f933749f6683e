//! Redis list-backed queue

use super::{JobQueue, Task, TaskEnvelope, TaskSource};
use crate::storage::redis::RedisPool;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Queue on a Redis list: producers `LPUSH`, consumers `BLMOVE` each
/// envelope into their own processing list and `LREM` it once acknowledged.
///
/// A consumer killed mid-task leaves the envelope in its processing list,
/// and `recover` moves it back when that consumer starts again. Blocking
/// moves run on a dedicated connection so they never stall the shared one.
pub struct RedisJobQueue {
    pool: RedisPool,
    key: String,
    processing_key: String,
    consumer: Mutex<Option<MultiplexedConnection>>,
    /// Raw payloads of unacknowledged deliveries, for `LREM`
    unacked: parking_lot::Mutex<HashMap<(Uuid, u32), String>>,
}

impl std::fmt::Debug for RedisJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobQueue")
            .field("key", &self.key)
            .field("processing_key", &self.processing_key)
            .finish_non_exhaustive()
    }
}

impl RedisJobQueue {
    pub fn new(pool: RedisPool, key: impl Into<String>, consumer: &str) -> Self {
        let key = key.into();
        Self {
            pool,
            processing_key: processing_key(&key, consumer),
            key,
            consumer: Mutex::new(None),
            unacked: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    async fn push(&self, envelope: &TaskEnvelope) -> Result<()> {
        let payload = serde_json::to_string(envelope)?;
        let mut conn = self.pool.connection();
        let _: i64 = redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(PipelineError::Redis)?;
        Ok(())
    }

    async fn forget(&self, raw: &str) -> Result<()> {
        let mut conn = self.pool.connection();
        let _: i64 = redis::cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(raw)
            .query_async(&mut conn)
            .await
            .map_err(PipelineError::Redis)?;
        Ok(())
    }
}

/// Processing list of one consumer
pub(crate) fn processing_key(key: &str, consumer: &str) -> String {
    format!("{}:processing:{}", key, consumer)
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, task: Task) -> Result<()> {
        self.push(&TaskEnvelope::new(task)).await
    }
}

#[async_trait]
impl TaskSource for RedisJobQueue {
    async fn next(&self, wait: Duration) -> Result<Option<TaskEnvelope>> {
        let mut consumer = self.consumer.lock().await;
        if consumer.is_none() {
            *consumer = Some(self.pool.dedicated_connection().await?);
        }
        let Some(conn) = consumer.as_mut() else {
            return Ok(None);
        };

        let mut cmd = if wait.is_zero() {
            redis::cmd("LMOVE")
        } else {
            redis::cmd("BLMOVE")
        };
        cmd.arg(&self.key)
            .arg(&self.processing_key)
            .arg("RIGHT")
            .arg("LEFT");
        if !wait.is_zero() {
            cmd.arg(wait.as_secs_f64());
        }
        let raw: Option<String> = cmd.query_async(conn).await.map_err(PipelineError::Redis)?;
        drop(consumer);

        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str::<TaskEnvelope>(&raw) {
            Ok(envelope) => {
                self.unacked.lock().insert(envelope.delivery(), raw);
                Ok(Some(envelope))
            }
            Err(e) => {
                // unreadable payloads are dropped, not retried forever
                warn!("Dropping malformed task on {}: {}", self.key, e);
                self.forget(&raw).await?;
                Ok(None)
            }
        }
    }

    async fn requeue(&self, envelope: TaskEnvelope) -> Result<()> {
        self.push(&envelope).await
    }

    async fn ack(&self, envelope: &TaskEnvelope) -> Result<()> {
        let raw = self.unacked.lock().remove(&envelope.delivery());
        match raw {
            Some(raw) => self.forget(&raw).await,
            None => Ok(()),
        }
    }

    async fn recover(&self) -> Result<usize> {
        let mut conn = self.pool.connection();
        let mut recovered = 0;
        loop {
            let moved: Option<String> = redis::cmd("LMOVE")
                .arg(&self.processing_key)
                .arg(&self.key)
                .arg("RIGHT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await
                .map_err(PipelineError::Redis)?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }
        self.unacked.lock().clear();
        Ok(recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_key_is_per_consumer() {
        assert_eq!(
            processing_key("lexflow:tasks", "worker-1"),
            "lexflow:tasks:processing:worker-1"
        );
        assert_ne!(
            processing_key("lexflow:tasks", "worker-1"),
            processing_key("lexflow:tasks", "worker-2")
        );
    }
}
