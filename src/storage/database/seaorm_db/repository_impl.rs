use crate::core::models::*;
use crate::storage::repository::{ReviewRepository, WorkItemRepository};
use crate::utils::error::Result;
use async_trait::async_trait;

use super::types::SeaOrmDatabase;

#[async_trait]
impl WorkItemRepository for SeaOrmDatabase {
    async fn upsert_lexeme(&self, lexeme: NewLexeme) -> Result<Lexeme> {
        self.insert_lexeme(lexeme).await
    }

    async fn scan_lexemes(
        &self,
        status: LexemeStatus,
        after_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Lexeme>> {
        self.find_lexemes_by_status(status, after_id, limit).await
    }

    async fn load_lexemes(&self, ids: &[i64]) -> Result<Vec<Lexeme>> {
        self.find_lexemes(ids).await
    }

    async fn transition_lexemes(
        &self,
        ids: &[i64],
        from: LexemeStatus,
        to: LexemeStatus,
    ) -> Result<Vec<i64>> {
        self.update_lexeme_status(ids, from, to).await
    }

    async fn upsert_result(&self, run_id: i64, output: &ProcessOutput) -> Result<()> {
        self.save_result(run_id, output).await
    }

    async fn results_for_run(&self, run_id: i64) -> Result<Vec<ProcessResult>> {
        self.find_results(run_id).await
    }

    async fn create_run(&self, processor: &str) -> Result<ProcessRun> {
        self.insert_run(processor).await
    }

    async fn get_run(&self, run_id: i64) -> Result<Option<ProcessRun>> {
        self.find_run(run_id).await
    }

    async fn start_run(&self, run_id: i64) -> Result<bool> {
        self.mark_run_started(run_id).await
    }

    async fn close_run(
        &self,
        run_id: i64,
        status: RunStatus,
        final_progress: &serde_json::Value,
    ) -> Result<bool> {
        self.mark_run_closed(run_id, status, Some(final_progress.clone()), None)
            .await
    }

    async fn fail_run(&self, run_id: i64, error: &str) -> Result<bool> {
        self.mark_run_closed(run_id, RunStatus::Failed, None, Some(error))
            .await
    }

    async fn soft_delete_run(&self, run_id: i64) -> Result<bool> {
        self.mark_run_deleted(run_id).await
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmDatabase {
    async fn review_context(&self, review_id: i64) -> Result<Option<ReviewContext>> {
        self.find_review_context(review_id).await
    }

    async fn set_apply_status(
        &self,
        review_id: i64,
        status: ApplyStatus,
        error: Option<&str>,
    ) -> Result<()> {
        self.update_apply_status(review_id, status, error).await
    }

    async fn set_review_status(&self, review_id: i64, status: ReviewStatus) -> Result<()> {
        self.update_review_status(review_id, status).await
    }

    async fn reviews_for_file(&self, file_id: i64) -> Result<Vec<OccurrenceReview>> {
        self.find_reviews_for_file(file_id).await
    }

    async fn occurrences_for_file(&self, file_id: i64) -> Result<Vec<Occurrence>> {
        self.find_occurrences_for_file(file_id).await
    }
}
