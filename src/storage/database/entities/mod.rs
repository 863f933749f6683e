/// Lexeme entity module
pub mod lexeme;
/// Occurrence entity module
pub mod occurrence;
/// Occurrence review entity module
pub mod occurrence_review;
/// Process result entity module
pub mod process_result;
/// Process run entity module
pub mod process_run;
/// Repository entity module
pub mod repository;
/// Source file entity module
pub mod source_file;

pub use lexeme::Entity as Lexeme;
pub use occurrence::Entity as Occurrence;
pub use occurrence_review::Entity as OccurrenceReview;
pub use process_result::Entity as ProcessResult;
pub use process_run::Entity as ProcessRun;
pub use repository::Entity as Repository;
pub use source_file::Entity as SourceFile;
