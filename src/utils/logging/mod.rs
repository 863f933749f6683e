//! Logging initialisation
//!
//! Installs the global tracing subscriber. `RUST_LOG` wins over the configured level.

use crate::config::LoggingConfig;
use crate::utils::error::{PipelineError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| PipelineError::Config(format!("Invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| PipelineError::Config(format!("Failed to initialise logging: {}", e)))
}
