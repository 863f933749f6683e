//! Storage layer for the pipeline
//!
//! Durable state lives in the database; counters, locks and broadcasts go
//! through Redis when it is enabled and fall back to in-process backends
//! otherwise.

/// Live progress broadcast
pub mod broadcast;
/// Atomic counters and locks
pub mod counters;
/// Database storage module
pub mod database;
/// In-memory repository
pub mod memory;
/// Job queue and task runner
pub mod queue;
/// Redis connection module
pub mod redis;
/// Repository traits
pub mod repository;

pub use memory::MemoryRepository;
pub use repository::{ReviewRepository, WorkItemRepository};

use crate::config::StorageConfig;
use crate::utils::error::Result;
use broadcast::{Broadcaster, LocalBroadcaster, RedisBroadcaster};
use counters::{CounterStore, MemoryCounterStore, RedisCounterStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Storage backends wired from configuration
#[derive(Clone)]
pub struct StorageLayer {
    /// Database connection pool
    pub database: Arc<database::Database>,
    /// Redis connection, absent when Redis is disabled
    pub redis: Option<redis::RedisPool>,
    pub counters: Arc<dyn CounterStore>,
    pub broadcaster: Arc<dyn Broadcaster>,
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");

        debug!("Connecting to database");
        let database = Arc::new(database::Database::new(&config.database).await?);

        let (redis, counters, broadcaster): (_, Arc<dyn CounterStore>, Arc<dyn Broadcaster>) =
            if config.redis.enabled {
                debug!("Connecting to Redis");
                let pool = redis::RedisPool::new(&config.redis).await?;
                (
                    Some(pool.clone()),
                    Arc::new(RedisCounterStore::new(pool.clone())),
                    Arc::new(RedisBroadcaster::new(pool)),
                )
            } else {
                warn!("Redis disabled, counters and broadcasts are local to this process");
                (
                    None,
                    Arc::new(MemoryCounterStore::new()),
                    Arc::new(LocalBroadcaster::default()),
                )
            };

        info!("Storage layer initialized successfully");
        Ok(Self {
            database,
            redis,
            counters,
            broadcaster,
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        self.database.migrate().await
    }

    /// Health check for all storage backends
    pub async fn health_check(&self) -> Result<()> {
        self.database.health_check().await?;
        if let Some(redis) = &self.redis {
            redis.health_check().await?;
        }
        Ok(())
    }
}
