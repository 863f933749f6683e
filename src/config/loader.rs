//! Configuration loading utilities
//!
//! Environment variables override whatever the file or the defaults provide.

use super::Config;
use super::models::QueueBackend;
use crate::utils::error::{PipelineError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PipelineError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Apply environment variable overrides in place
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        debug!("Applying environment overrides");

        // Storage configuration
        if let Ok(db_url) = env::var("DATABASE_URL") {
            self.storage.database.url = db_url;
        }
        if let Some(max_conn) = parse_var("DATABASE_MAX_CONNECTIONS")? {
            self.storage.database.max_connections = max_conn;
        }
        if let Ok(redis_url) = env::var("REDIS_URL") {
            self.storage.redis.url = redis_url;
        }
        if let Some(enabled) = parse_var("REDIS_ENABLED")? {
            self.storage.redis.enabled = enabled;
        }

        // Pipeline configuration
        if let Some(budget) = parse_var("LEXFLOW_MAX_TOKENS_PER_BATCH")? {
            self.pipeline.max_tokens_per_batch = budget;
        }
        if let Some(page_size) = parse_var("LEXFLOW_PAGE_SIZE")? {
            self.pipeline.page_size = page_size;
        }

        // Queue configuration
        if let Ok(backend) = env::var("LEXFLOW_QUEUE_BACKEND") {
            self.queue.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "local" => QueueBackend::Local,
                "redis" => QueueBackend::Redis,
                other => {
                    return Err(PipelineError::Config(format!(
                        "Invalid LEXFLOW_QUEUE_BACKEND: {}",
                        other
                    )));
                }
            };
        }
        if let Some(concurrency) = parse_var("LEXFLOW_WORKER_CONCURRENCY")? {
            self.queue.concurrency = concurrency;
        }

        // Logging configuration
        if let Ok(level) = env::var("LEXFLOW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_var("LEXFLOW_LOG_JSON")? {
            self.logging.json = json;
        }

        Ok(())
    }
}
