//! Repository traits the pipeline and the patch engine persist through
//!
//! Both are implemented by the SeaORM database and by the in-memory store.

use crate::core::models::*;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable lexemes, runs and results
#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    /// Record a lexeme, returning the existing row when its fingerprint is known
    async fn upsert_lexeme(&self, lexeme: NewLexeme) -> Result<Lexeme>;

    /// Page through lexemes in `status`, ordered by id, strictly after `after_id`
    async fn scan_lexemes(
        &self,
        status: LexemeStatus,
        after_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Lexeme>>;

    /// Load lexemes by id; unknown ids are skipped
    async fn load_lexemes(&self, ids: &[i64]) -> Result<Vec<Lexeme>>;

    /// Atomically move the rows among `ids` that are in `from` to `to`.
    ///
    /// Returns the ids actually transitioned. Rows in any other status are
    /// untouched, which is what makes this usable as an exclusive claim.
    async fn transition_lexemes(
        &self,
        ids: &[i64],
        from: LexemeStatus,
        to: LexemeStatus,
    ) -> Result<Vec<i64>>;

    /// Insert or overwrite the result of one (run, lexeme) pair
    async fn upsert_result(&self, run_id: i64, output: &ProcessOutput) -> Result<()>;

    async fn results_for_run(&self, run_id: i64) -> Result<Vec<ProcessResult>>;

    async fn create_run(&self, processor: &str) -> Result<ProcessRun>;

    /// Fetch a run; soft-deleted runs are reported as missing
    async fn get_run(&self, run_id: i64) -> Result<Option<ProcessRun>>;

    /// `pending -> running`. Returns false when the run was not pending.
    async fn start_run(&self, run_id: i64) -> Result<bool>;

    /// `{pending, running} -> status` with the final payload. Returns false
    /// when the run was already terminal or missing.
    async fn close_run(
        &self,
        run_id: i64,
        status: RunStatus,
        final_progress: &serde_json::Value,
    ) -> Result<bool>;

    /// `{pending, running} -> failed` with an error message
    async fn fail_run(&self, run_id: i64, error: &str) -> Result<bool>;

    async fn soft_delete_run(&self, run_id: i64) -> Result<bool>;
}

/// Occurrence reviews and the files they point into
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// A review with its occurrence, file and repository, each possibly missing
    async fn review_context(&self, review_id: i64) -> Result<Option<ReviewContext>>;

    async fn set_apply_status(
        &self,
        review_id: i64,
        status: ApplyStatus,
        error: Option<&str>,
    ) -> Result<()>;

    async fn set_review_status(&self, review_id: i64, status: ReviewStatus) -> Result<()>;

    /// Every review whose occurrence lives in `file_id`
    async fn reviews_for_file(&self, file_id: i64) -> Result<Vec<OccurrenceReview>>;

    async fn occurrences_for_file(&self, file_id: i64) -> Result<Vec<Occurrence>>;
}
