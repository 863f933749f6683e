//! Domain models shared by the pipeline, the patch engine and the storage backends

mod lexeme;
mod progress;
mod review;
mod run;
mod status;

pub use lexeme::{Lexeme, NewLexeme, ProcessOutput, ProcessResult};
pub use progress::ProgressPayload;
pub use review::{
    NewOccurrence, Occurrence, OccurrenceReview, RepositoryRecord, ReviewContext, SourceFile,
};
pub use run::ProcessRun;
pub use status::{ApplyStatus, LexemeStatus, ReviewStatus, RunStatus};
