//! Configuration loading tests

#[cfg(test)]
mod tests {
    use lexflow::config::{Config, QueueBackend};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_full_config_file() {
        let yaml = r#"
pipeline:
  max_tokens_per_batch: 1200
  page_size: 250
  progress_throttle_ms: 500
storage:
  database:
    url: "sqlite::memory:"
  redis:
    url: "redis://localhost:6379"
    enabled: false
queue:
  backend: local
  concurrency: 2
vcs:
  author_name: "lexflow"
  author_email: "lexflow@example.com"
processors:
  - name: "dry-run"
    kind: "identity"
logging:
  level: "debug"
  json: true
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.pipeline.max_tokens_per_batch, 1200);
        assert_eq!(config.pipeline.page_size, 250);
        assert_eq!(config.queue.backend, QueueBackend::Local);
        assert_eq!(config.queue.concurrency, 2);
        assert!(!config.storage.redis.enabled);
        assert_eq!(config.vcs.author_name.as_deref(), Some("lexflow"));
        assert!(config.logging.json);
        assert!(config.processor("dry-run").is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/lexflow.yaml")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[tokio::test]
    async fn test_duplicate_processor_names_rejected() {
        let yaml = r#"
processors:
  - name: "dry-run"
    kind: "identity"
  - name: "dry-run"
    kind: "identity"
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        assert!(Config::from_file(file.path()).await.is_err());
    }
}
