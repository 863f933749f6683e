//! Pass-through processor for dry runs

use super::{Processor, ProcessorInput, id_text_pairs};
use crate::config::ProcessorConfig;
use crate::core::models::{Lexeme, ProcessOutput};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Item {
    id: i64,
    text: String,
}

/// Emits each lexeme's normalized text, optionally prefixed
#[derive(Debug, Clone, Default)]
pub struct IdentityProcessor {
    name: String,
    prefix: String,
}

impl IdentityProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Result<Self> {
        Ok(Self {
            name: config.name.clone(),
            prefix: config.setting_str("prefix").unwrap_or_default().to_string(),
        })
    }
}

#[async_trait]
impl Processor for IdentityProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_input(&self, lexemes: &[Lexeme]) -> Result<ProcessorInput> {
        Ok(id_text_pairs(lexemes))
    }

    async fn run(&self, input: ProcessorInput) -> Result<Vec<ProcessOutput>> {
        let items: Vec<Item> = serde_json::from_value(input)
            .map_err(|e| PipelineError::processor(format!("bad identity input: {}", e)))?;
        Ok(items
            .into_iter()
            .map(|item| ProcessOutput {
                lexeme_id: item.id,
                output: serde_json::Value::String(format!("{}{}", self.prefix, item.text)),
                metadata: serde_json::json!({ "processor": self.name }),
            })
            .collect())
    }
}
