//! Pipeline, queue, processor and VCS validators

use super::trait_def::Validate;
use crate::config::models::*;
use std::collections::HashSet;

impl Validate for PipelineSettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_tokens_per_batch == 0 {
            return Err("max_tokens_per_batch must be greater than 0".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be greater than 0".to_string());
        }
        if self.counter_ttl_secs == 0 {
            return Err("counter_ttl_secs must be greater than 0".to_string());
        }
        if self.finalize_lock_ttl_secs == 0 {
            return Err("finalize_lock_ttl_secs must be greater than 0".to_string());
        }
        if self.finalize_lock_ttl_secs >= self.counter_ttl_secs {
            return Err("finalize_lock_ttl_secs must be shorter than counter_ttl_secs".to_string());
        }
        Ok(())
    }
}

impl Validate for QueueConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("Queue concurrency must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("Queue max_attempts must be at least 1".to_string());
        }
        if self.backend == QueueBackend::Redis && self.key.trim().is_empty() {
            return Err("Queue key cannot be empty for the redis backend".to_string());
        }
        if self.backend == QueueBackend::Redis && self.consumer.trim().is_empty() {
            return Err("Queue consumer cannot be empty for the redis backend".to_string());
        }
        Ok(())
    }
}

impl Validate for ProcessorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Processor name cannot be empty".to_string());
        }
        if self.kind.trim().is_empty() {
            return Err(format!("Processor {} has no kind", self.name));
        }
        Ok(())
    }
}

impl Validate for [ProcessorConfig] {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for processor in self {
            processor.validate()?;
            if !seen.insert(processor.name.as_str()) {
                return Err(format!("Duplicate processor name: {}", processor.name));
            }
        }
        Ok(())
    }
}

impl Validate for VcsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.git_binary.trim().is_empty() {
            return Err("git_binary cannot be empty".to_string());
        }
        if self.author_name.is_some() != self.author_email.is_some() {
            return Err("author_name and author_email must be set together".to_string());
        }
        if self.file_lock_ttl_secs == 0 {
            return Err("file_lock_ttl_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
