//! Redis connection pool and core connection management

use crate::config::RedisConfig;
use crate::utils::error::{PipelineError, Result};
use redis::{Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info};

/// Redis client with one shared multiplexed connection
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
    shared: MultiplexedConnection,
    connection_timeout: Duration,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("connection_timeout", &self.connection_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisPool {
    /// Create a new Redis pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(PipelineError::Redis)?;
        let connection_timeout = Duration::from_secs(config.connection_timeout);
        let shared = Self::open(&client, connection_timeout).await?;

        info!("Redis connection pool created successfully");
        Ok(Self {
            client,
            shared,
            connection_timeout,
        })
    }

    async fn open(client: &Client, timeout: Duration) -> Result<MultiplexedConnection> {
        tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| PipelineError::Internal("Timed out connecting to Redis".to_string()))?
            .map_err(PipelineError::Redis)
    }

    /// The shared connection; cheap to clone
    pub fn connection(&self) -> MultiplexedConnection {
        self.shared.clone()
    }

    /// A connection of its own, for blocking commands such as BRPOP
    pub async fn dedicated_connection(&self) -> Result<MultiplexedConnection> {
        Self::open(&self.client, self.connection_timeout).await
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let mut conn = self.connection();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(PipelineError::Redis)?;
        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
