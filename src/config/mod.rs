//! Configuration management for the pipeline
//!
//! This module handles loading, validation, and management of all pipeline configuration.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub vcs: VcsConfig,
    /// Processors a run may name
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a processor configuration by name
    pub fn processor(&self, name: &str) -> Option<&ProcessorConfig> {
        self.processors.iter().find(|p| p.name == name)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.pipeline
            .validate()
            .map_err(|e| PipelineError::Config(format!("Pipeline config error: {}", e)))?;

        self.storage
            .validate()
            .map_err(|e| PipelineError::Config(format!("Storage config error: {}", e)))?;

        self.queue
            .validate()
            .map_err(|e| PipelineError::Config(format!("Queue config error: {}", e)))?;

        self.vcs
            .validate()
            .map_err(|e| PipelineError::Config(format!("VCS config error: {}", e)))?;

        self.processors
            .as_slice()
            .validate()
            .map_err(|e| PipelineError::Config(format!("Processor config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
pipeline:
  max_tokens_per_batch: 800
  page_size: 100

storage:
  database:
    url: "postgresql://localhost/lexflow"
  redis:
    url: "redis://localhost:6379"

queue:
  backend: redis
  concurrency: 6

processors:
  - name: "zh-en"
    kind: "openai_translate"
    settings:
      model: "gpt-4o-mini"
      target_language: "English"
  - name: "dry-run"
    kind: "identity"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.pipeline.max_tokens_per_batch, 800);
        assert_eq!(config.queue.backend, QueueBackend::Redis);
        assert_eq!(config.processors.len(), 2);
        let zh_en = config.processor("zh-en").unwrap();
        assert_eq!(zh_en.setting_str("model"), Some("gpt-4o-mini"));
        assert!(config.processor("missing").is_none());
    }

    #[tokio::test]
    async fn test_config_from_file_rejects_invalid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"pipeline:\n  max_tokens_per_batch: 0\n")
            .unwrap();

        let err = Config::from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let mut config = Config::default();
        config.processors.push(ProcessorConfig::new("dry-run", "identity"));
        let yaml = config.to_yaml().unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.processors, config.processors);
    }
}
