//! Tests for configuration validation

#[cfg(test)]
mod tests {
    use super::super::trait_def::Validate;
    use crate::config::models::*;

    #[test]
    fn test_database_config_validation() {
        let mut config = DatabaseConfig::default();
        assert!(config.validate().is_ok());

        config.url = "postgres://localhost/lexflow".to_string();
        assert!(config.validate().is_ok());

        config.url = "mysql://localhost/lexflow".to_string();
        assert!(config.validate().is_err());

        config.url = "sqlite::memory:".to_string();
        config.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redis_config_validation() {
        let mut config = RedisConfig::default();
        assert!(config.validate().is_ok());

        config.url = "http://localhost:6379".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_redis_is_not_validated() {
        let config = StorageConfig {
            database: DatabaseConfig::default(),
            redis: RedisConfig {
                url: String::new(),
                enabled: false,
                connection_timeout: 5,
            },
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pipeline_settings_validation() {
        let mut settings = PipelineSettings::default();
        assert!(settings.validate().is_ok());

        settings.max_tokens_per_batch = 0;
        assert!(settings.validate().is_err());

        settings.max_tokens_per_batch = 100;
        settings.finalize_lock_ttl_secs = settings.counter_ttl_secs;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_queue_config_validation() {
        let mut config = QueueConfig::default();
        assert!(config.validate().is_ok());

        config.concurrency = 0;
        assert!(config.validate().is_err());

        config.concurrency = 2;
        config.backend = QueueBackend::Redis;
        config.key = " ".to_string();
        assert!(config.validate().is_err());

        config.key = "lexflow:tasks".to_string();
        config.consumer = String::new();
        assert!(config.validate().unwrap_err().contains("consumer"));
    }

    #[test]
    fn test_processor_list_rejects_duplicates() {
        let processors = vec![
            ProcessorConfig::new("zh-en", "openai_translate"),
            ProcessorConfig::new("zh-en", "identity"),
        ];
        let err = processors.as_slice().validate().unwrap_err();
        assert!(err.contains("Duplicate processor name"));
    }

    #[test]
    fn test_vcs_author_pair() {
        let config = VcsConfig {
            author_name: Some("Release Bot".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vcs_file_lock_ttl_must_be_positive() {
        let config = VcsConfig {
            file_lock_ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("file_lock_ttl_secs"));
        assert!(VcsConfig::default().validate().is_ok());
    }
}
