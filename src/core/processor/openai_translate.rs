//! Translation through an OpenAI-compatible chat completions endpoint

use super::{Processor, ProcessorInput, id_text_pairs};
use crate::config::ProcessorConfig;
use crate::core::models::{Lexeme, ProcessOutput};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Settings of an `openai_translate` processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Inline key; takes precedence over `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub target_language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TranslateSettings {
    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationAnswer {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    id: i64,
    text: String,
}

/// One chat completion request per batch; the model answers with a JSON
/// object keyed by lexeme id.
#[derive(Debug, Clone)]
pub struct OpenAiTranslateProcessor {
    name: String,
    settings: TranslateSettings,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiTranslateProcessor {
    pub fn new(name: impl Into<String>, settings: TranslateSettings) -> Result<Self> {
        let name = name.into();
        let api_key = settings.resolve_api_key().ok_or_else(|| {
            PipelineError::config(format!(
                "processor {}: no API key (set api_key or {})",
                name, settings.api_key_env
            ))
        })?;
        if settings.target_language.trim().is_empty() {
            return Err(PipelineError::config(format!(
                "processor {}: target_language is required",
                name
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            name,
            settings,
            api_key,
            client,
        })
    }

    pub fn from_config(config: &ProcessorConfig) -> Result<Self> {
        let settings: TranslateSettings = serde_json::from_value(config.settings.clone())
            .map_err(|e| PipelineError::config(format!("processor {}: {}", config.name, e)))?;
        Self::new(config.name.clone(), settings)
    }

    fn system_prompt(&self) -> String {
        format!(
            "Translate each item's text into {}. Keep placeholders, markup and \
             punctuation intact. Answer with a JSON object of the form \
             {{\"translations\": [{{\"id\": <id>, \"text\": <translation>}}]}} \
             containing every id you were given.",
            self.settings.target_language
        )
    }
}

#[async_trait]
impl Processor for OpenAiTranslateProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_input(&self, lexemes: &[Lexeme]) -> Result<ProcessorInput> {
        Ok(serde_json::json!({ "items": id_text_pairs(lexemes) }))
    }

    async fn run(&self, input: ProcessorInput) -> Result<Vec<ProcessOutput>> {
        let url = format!("{}/chat/completions", self.settings.api_base.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.settings.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": self.system_prompt() },
                { "role": "user", "content": serde_json::to_string(&input)? },
            ],
        });

        debug!("Processor {} posting batch to {}", self.name, url);
        let response: ChatResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PipelineError::processor("empty completion"))?;
        let answer: TranslationAnswer = serde_json::from_str(&content)
            .map_err(|e| PipelineError::processor(format!("unparseable translation answer: {}", e)))?;

        Ok(answer
            .translations
            .into_iter()
            .map(|translation| ProcessOutput {
                lexeme_id: translation.id,
                output: serde_json::json!({
                    "text": translation.text,
                    "target_language": self.settings.target_language,
                }),
                metadata: serde_json::json!({ "model": self.settings.model }),
            })
            .collect())
    }
}
