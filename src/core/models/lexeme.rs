//! Lexemes and per-run processing results

use super::status::LexemeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A deduplicated unit of discovered source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexeme {
    pub id: i64,
    /// Hex SHA-256 of the normalized text, unique
    pub fingerprint: String,
    pub source_text: String,
    pub normalized_text: String,
    pub status: LexemeStatus,
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Lexeme {
    /// Content fingerprint used to deduplicate lexemes
    pub fn fingerprint(normalized_text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalized_text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Input for recording a newly observed lexeme
#[derive(Debug, Clone, PartialEq)]
pub struct NewLexeme {
    pub source_text: String,
    pub normalized_text: String,
    pub metadata: serde_json::Value,
}

impl NewLexeme {
    /// Normalizes by trimming and collapsing internal whitespace runs
    pub fn new(source_text: impl Into<String>) -> Self {
        let source_text = source_text.into();
        let normalized_text = source_text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            source_text,
            normalized_text,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn fingerprint(&self) -> String {
        Lexeme::fingerprint(&self.normalized_text)
    }
}

/// One transformed lexeme produced by a processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub lexeme_id: i64,
    pub output: serde_json::Value,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Persisted output of one (run, lexeme) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub run_id: i64,
    pub lexeme_id: i64,
    pub output: serde_json::Value,
    pub metadata: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
