//! Named processor configuration

use serde::{Deserialize, Serialize};

/// A named processor instance a run can refer to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorConfig {
    /// Name referenced by process runs
    pub name: String,
    /// Registered processor kind (e.g. "identity", "openai_translate")
    pub kind: String,
    /// Kind-specific settings
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl ProcessorConfig {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            settings: serde_json::Value::Null,
        }
    }

    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = settings;
        self
    }

    /// Read a string setting
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }
}
