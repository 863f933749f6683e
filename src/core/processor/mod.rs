//! Processor plugins
//!
//! A processor turns a batch of lexemes into outputs in three steps:
//! `build_input`, `run`, `write_results`. Processors are resolved by the name
//! a run was created with; the registry maps that name to a configured kind
//! and the kind to a factory.

mod identity;
mod openai_translate;
mod registry;
mod writer;


pub use identity::IdentityProcessor;
pub use openai_translate::{OpenAiTranslateProcessor, TranslateSettings};
pub use registry::{ProcessorFactory, ProcessorRegistry};
pub use writer::ResultWriter;

use crate::core::models::{Lexeme, ProcessOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Processor-specific representation of a batch
pub type ProcessorInput = serde_json::Value;

#[async_trait]
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn build_input(&self, lexemes: &[Lexeme]) -> Result<ProcessorInput>;

    async fn run(&self, input: ProcessorInput) -> Result<Vec<ProcessOutput>>;

    /// Persist outputs one at a time, so items that succeed stay succeeded
    /// if a later one fails.
    async fn write_results(
        &self,
        outputs: Vec<ProcessOutput>,
        writer: &mut ResultWriter<'_>,
    ) -> Result<()> {
        for output in outputs {
            writer.record(output).await?;
        }
        Ok(())
    }
}

/// `[{"id": .., "text": ..}]` over the normalized text, the shape both
/// built-in processors send.
pub(crate) fn id_text_pairs(lexemes: &[Lexeme]) -> ProcessorInput {
    serde_json::Value::Array(
        lexemes
            .iter()
            .map(|lexeme| serde_json::json!({ "id": lexeme.id, "text": lexeme.normalized_text }))
            .collect(),
    )
}
