//! Error types for the pipeline

use thiserror::Error;

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown processor name in a run's configuration
    #[error("Processor not found: {0}")]
    ProcessorNotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Optimistic concurrency conflicts
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Version control errors
    #[error("VCS error: {0}")]
    Vcs(String),

    /// Job queue errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// Errors raised by a processor while transforming a batch
    #[error("Processor error: {0}")]
    Processor(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether retrying the failed operation later may succeed.
    ///
    /// Infrastructure failures are transient; configuration, validation and
    /// processor failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::Database(_)
                | PipelineError::Redis(_)
                | PipelineError::HttpClient(_)
                | PipelineError::Io(_)
                | PipelineError::Queue(_)
                | PipelineError::Vcs(_)
        )
    }
}
