//! Redis counter store

use super::CounterStore;
use crate::storage::redis::RedisPool;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

/// Counter store on Redis `INCRBY` / `SET NX PX`
#[derive(Debug, Clone)]
pub struct RedisCounterStore {
    pool: RedisPool,
}

impl RedisCounterStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

/// `DEL` only while the key still holds `ARGV[1]`
const DELETE_IF_EQUAL: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

fn ttl_millis(ttl: Duration) -> i64 {
    // PX rejects zero
    (ttl.as_millis() as i64).max(1)
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, delta: i64, ttl: Duration) -> Result<i64> {
        let mut conn = self.pool.connection();
        let (value,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, delta)
            .pexpire(key, ttl_millis(ttl))
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(PipelineError::Redis)?;
        Ok(value)
    }

    async fn write(
        &self,
        key: &str,
        value: i64,
        ttl: Duration,
        only_if_absent: bool,
    ) -> Result<bool> {
        let mut conn = self.pool.connection();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("PX").arg(ttl_millis(ttl));
        if only_if_absent {
            cmd.arg("NX");
        }
        // nil reply means NX refused the write
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(PipelineError::Redis)?;
        Ok(reply.is_some())
    }

    async fn read(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.pool.connection();
        let value: Option<i64> = conn.get(key).await.map_err(PipelineError::Redis)?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.connection();
        let _: () = conn.del(key).await.map_err(PipelineError::Redis)?;
        Ok(())
    }

    async fn delete_if_equal(&self, key: &str, value: i64) -> Result<bool> {
        let mut conn = self.pool.connection();
        let script = redis::Script::new(DELETE_IF_EQUAL);
        let deleted: i64 = script
            .key(key)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(PipelineError::Redis)?;
        Ok(deleted > 0)
    }
}
