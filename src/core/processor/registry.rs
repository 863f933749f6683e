//! Processor registry
//!
//! Maps processor kinds to factories and configured names to settings.

use super::{IdentityProcessor, OpenAiTranslateProcessor, Processor};
use crate::config::ProcessorConfig;
use crate::utils::error::{PipelineError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a processor from its configuration
pub type ProcessorFactory =
    Arc<dyn Fn(&ProcessorConfig) -> Result<Arc<dyn Processor>> + Send + Sync>;

/// Processor registry
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
    configs: HashMap<String, ProcessorConfig>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in kinds `identity` and `openai_translate`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_kind("identity", |config| {
            Ok(Arc::new(IdentityProcessor::from_config(config)?) as Arc<dyn Processor>)
        });
        registry.register_kind("openai_translate", |config| {
            Ok(Arc::new(OpenAiTranslateProcessor::from_config(config)?) as Arc<dyn Processor>)
        });
        registry
    }

    /// Built-ins plus the configured processors
    pub fn from_configs(configs: &[ProcessorConfig]) -> Self {
        let mut registry = Self::with_builtins();
        for config in configs {
            registry.register_config(config.clone());
        }
        registry
    }

    /// Register a processor kind
    pub fn register_kind<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ProcessorConfig) -> Result<Arc<dyn Processor>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    /// Register a named processor configuration
    pub fn register_config(&mut self, config: ProcessorConfig) {
        self.configs.insert(config.name.clone(), config);
    }

    /// Build the processor a run refers to.
    ///
    /// A name without configuration resolves to the kind of the same name
    /// with empty settings.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Processor>> {
        let config = match self.configs.get(name) {
            Some(config) => config.clone(),
            None if self.factories.contains_key(name) => ProcessorConfig::new(name, name),
            None => return Err(PipelineError::processor_not_found(name)),
        };

        let factory = self.factories.get(&config.kind).ok_or_else(|| {
            PipelineError::processor_not_found(format!("{} (kind {})", name, config.kind))
        })?;
        factory(&config)
    }

    /// Configured processor names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a kind is registered
    pub fn has_kind(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .field("processors", &self.configs.keys().collect::<Vec<_>>())
            .finish()
    }
}
