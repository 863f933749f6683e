//! Redis pub/sub broadcaster

use super::{Broadcaster, RunEvent};
use crate::storage::redis::RedisPool;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;

/// Publishes JSON-encoded events with `PUBLISH`
#[derive(Debug, Clone)]
pub struct RedisBroadcaster {
    pool: RedisPool,
}

impl RedisBroadcaster {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Broadcaster for RedisBroadcaster {
    async fn publish(&self, channel: &str, event: &RunEvent) -> Result<()> {
        let message = serde_json::to_string(event)?;
        let mut conn = self.pool.connection();
        let _: i64 = conn
            .publish(channel, message)
            .await
            .map_err(PipelineError::Redis)?;
        Ok(())
    }
}
