//! In-process repository
//!
//! Implements both repository traits over plain maps behind one lock, so
//! every operation is atomic with respect to every other. Used by tests and
//! single-process dry runs.

use crate::core::models::*;
use crate::storage::repository::{ReviewRepository, WorkItemRepository};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    lexemes: BTreeMap<i64, Lexeme>,
    fingerprints: HashMap<String, i64>,
    runs: BTreeMap<i64, ProcessRun>,
    results: BTreeMap<(i64, i64), ProcessResult>,
    repositories: BTreeMap<i64, RepositoryRecord>,
    files: BTreeMap<i64, SourceFile>,
    occurrences: BTreeMap<i64, Occurrence>,
    reviews: BTreeMap<i64, OccurrenceReview>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_run_mut(&mut self, run_id: i64) -> Option<&mut ProcessRun> {
        self.runs.get_mut(&run_id).filter(|run| !run.is_deleted())
    }
}

/// Repository held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_repository(&self, name: &str, local_path: &str) -> Result<RepositoryRecord> {
        let mut tables = self.tables.write();
        if tables.repositories.values().any(|repo| repo.name == name) {
            return Err(PipelineError::conflict(format!("repository {} exists", name)));
        }
        let record = RepositoryRecord {
            id: tables.next_id(),
            name: name.to_string(),
            local_path: local_path.to_string(),
        };
        tables.repositories.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn create_source_file(&self, repository_id: i64, path: &str) -> Result<SourceFile> {
        let mut tables = self.tables.write();
        let file = SourceFile {
            id: tables.next_id(),
            repository_id,
            path: path.to_string(),
        };
        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    pub fn create_occurrence(&self, new: NewOccurrence) -> Result<Occurrence> {
        let mut tables = self.tables.write();
        let occurrence = Occurrence {
            id: tables.next_id(),
            lexeme_id: new.lexeme_id,
            file_id: new.file_id,
            line_at: new.line_at,
            start: new.start,
            end: new.end,
            matched_text: new.matched_text,
        };
        tables.occurrences.insert(occurrence.id, occurrence.clone());
        Ok(occurrence)
    }

    pub fn create_review(
        &self,
        occurrence_id: i64,
        replacement: Option<&str>,
    ) -> Result<OccurrenceReview> {
        let mut tables = self.tables.write();
        let review = OccurrenceReview {
            id: tables.next_id(),
            occurrence_id,
            status: ReviewStatus::Pending,
            apply_status: ApplyStatus::NotApplied,
            replacement: replacement.map(str::to_string),
            apply_error: None,
            applied_at: None,
        };
        tables.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    /// Drop an occurrence and, like the database cascade, its reviews
    pub fn delete_occurrence(&self, occurrence_id: i64) -> bool {
        let mut tables = self.tables.write();
        let removed = tables.occurrences.remove(&occurrence_id).is_some();
        tables
            .reviews
            .retain(|_, review| review.occurrence_id != occurrence_id);
        removed
    }

    /// Every lexeme, for assertions
    pub fn lexemes(&self) -> Vec<Lexeme> {
        self.tables.read().lexemes.values().cloned().collect()
    }

    /// A run including soft-deleted ones
    pub fn raw_run(&self, run_id: i64) -> Option<ProcessRun> {
        self.tables.read().runs.get(&run_id).cloned()
    }

    pub fn review(&self, review_id: i64) -> Option<OccurrenceReview> {
        self.tables.read().reviews.get(&review_id).cloned()
    }

    fn close(
        &self,
        run_id: i64,
        status: RunStatus,
        final_progress: Option<&serde_json::Value>,
        error: Option<&str>,
    ) -> Result<bool> {
        if !status.is_terminal() {
            return Err(PipelineError::validation(format!(
                "cannot close run {} as {}",
                run_id, status
            )));
        }
        let mut tables = self.tables.write();
        let Some(run) = tables.live_run_mut(run_id) else {
            return Ok(false);
        };
        if run.is_terminal() {
            return Ok(false);
        }
        run.status = status;
        run.finished_at = Some(Utc::now());
        if let Some(final_progress) = final_progress {
            run.final_progress = Some(final_progress.clone());
        }
        if let Some(error) = error {
            run.error = Some(error.to_string());
        }
        Ok(true)
    }
}

#[async_trait]
impl WorkItemRepository for MemoryRepository {
    async fn upsert_lexeme(&self, lexeme: NewLexeme) -> Result<Lexeme> {
        let fingerprint = lexeme.fingerprint();
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .fingerprints
            .get(&fingerprint)
            .and_then(|id| tables.lexemes.get(id))
        {
            return Ok(existing.clone());
        }

        let record = Lexeme {
            id: tables.next_id(),
            fingerprint: fingerprint.clone(),
            source_text: lexeme.source_text,
            normalized_text: lexeme.normalized_text,
            status: LexemeStatus::Pending,
            processed_at: None,
            metadata: lexeme.metadata,
        };
        tables.fingerprints.insert(fingerprint, record.id);
        tables.lexemes.insert(record.id, record.clone());
        Ok(record)
    }

    async fn scan_lexemes(
        &self,
        status: LexemeStatus,
        after_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Lexeme>> {
        let tables = self.tables.read();
        let lower = after_id.map_or(i64::MIN, |id| id.saturating_add(1));
        Ok(tables
            .lexemes
            .range(lower..)
            .map(|(_, lexeme)| lexeme)
            .filter(|lexeme| lexeme.status == status)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn load_lexemes(&self, ids: &[i64]) -> Result<Vec<Lexeme>> {
        let tables = self.tables.read();
        let mut found: Vec<Lexeme> = ids
            .iter()
            .filter_map(|id| tables.lexemes.get(id).cloned())
            .collect();
        found.sort_by_key(|lexeme| lexeme.id);
        found.dedup_by_key(|lexeme| lexeme.id);
        Ok(found)
    }

    async fn transition_lexemes(
        &self,
        ids: &[i64],
        from: LexemeStatus,
        to: LexemeStatus,
    ) -> Result<Vec<i64>> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let mut moved = Vec::new();
        for id in ids {
            if let Some(lexeme) = tables.lexemes.get_mut(id) {
                if lexeme.status == from {
                    lexeme.status = to;
                    if matches!(to, LexemeStatus::Succeeded | LexemeStatus::Failed) {
                        lexeme.processed_at = Some(now);
                    }
                    moved.push(*id);
                }
            }
        }
        moved.sort_unstable();
        Ok(moved)
    }

    async fn upsert_result(&self, run_id: i64, output: &ProcessOutput) -> Result<()> {
        let mut tables = self.tables.write();
        tables.results.insert(
            (run_id, output.lexeme_id),
            ProcessResult {
                run_id,
                lexeme_id: output.lexeme_id,
                output: output.output.clone(),
                metadata: output.metadata.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn results_for_run(&self, run_id: i64) -> Result<Vec<ProcessResult>> {
        let tables = self.tables.read();
        Ok(tables
            .results
            .range((run_id, i64::MIN)..=(run_id, i64::MAX))
            .map(|(_, result)| result.clone())
            .collect())
    }

    async fn create_run(&self, processor: &str) -> Result<ProcessRun> {
        let mut tables = self.tables.write();
        let run = ProcessRun {
            id: tables.next_id(),
            processor: processor.to_string(),
            status: RunStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            final_progress: None,
            error: None,
            deleted_at: None,
        };
        tables.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn get_run(&self, run_id: i64) -> Result<Option<ProcessRun>> {
        let tables = self.tables.read();
        Ok(tables
            .runs
            .get(&run_id)
            .filter(|run| !run.is_deleted())
            .cloned())
    }

    async fn start_run(&self, run_id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.live_run_mut(run_id) {
            Some(run) if run.status == RunStatus::Pending => {
                run.status = RunStatus::Running;
                run.started_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn close_run(
        &self,
        run_id: i64,
        status: RunStatus,
        final_progress: &serde_json::Value,
    ) -> Result<bool> {
        self.close(run_id, status, Some(final_progress), None)
    }

    async fn fail_run(&self, run_id: i64, error: &str) -> Result<bool> {
        self.close(run_id, RunStatus::Failed, None, Some(error))
    }

    async fn soft_delete_run(&self, run_id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.live_run_mut(run_id) {
            Some(run) => {
                run.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ReviewRepository for MemoryRepository {
    async fn review_context(&self, review_id: i64) -> Result<Option<ReviewContext>> {
        let tables = self.tables.read();
        let Some(review) = tables.reviews.get(&review_id).cloned() else {
            return Ok(None);
        };
        let occurrence = tables.occurrences.get(&review.occurrence_id).cloned();
        let file = occurrence
            .as_ref()
            .and_then(|occurrence| tables.files.get(&occurrence.file_id))
            .cloned();
        let repository = file
            .as_ref()
            .and_then(|file| tables.repositories.get(&file.repository_id))
            .cloned();
        Ok(Some(ReviewContext {
            review,
            occurrence,
            file,
            repository,
        }))
    }

    async fn set_apply_status(
        &self,
        review_id: i64,
        status: ApplyStatus,
        error: Option<&str>,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        let review = tables
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| PipelineError::not_found(format!("review {}", review_id)))?;
        review.apply_status = status;
        review.apply_error = error.map(str::to_string);
        if status == ApplyStatus::Applied {
            review.applied_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_review_status(&self, review_id: i64, status: ReviewStatus) -> Result<()> {
        let mut tables = self.tables.write();
        let review = tables
            .reviews
            .get_mut(&review_id)
            .ok_or_else(|| PipelineError::not_found(format!("review {}", review_id)))?;
        review.status = status;
        Ok(())
    }

    async fn reviews_for_file(&self, file_id: i64) -> Result<Vec<OccurrenceReview>> {
        let tables = self.tables.read();
        Ok(tables
            .reviews
            .values()
            .filter(|review| {
                tables
                    .occurrences
                    .get(&review.occurrence_id)
                    .is_some_and(|occurrence| occurrence.file_id == file_id)
            })
            .cloned()
            .collect())
    }

    async fn occurrences_for_file(&self, file_id: i64) -> Result<Vec<Occurrence>> {
        let tables = self.tables.read();
        Ok(tables
            .occurrences
            .values()
            .filter(|occurrence| occurrence.file_id == file_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_lexeme_deduplicates_by_fingerprint() {
        let repo = MemoryRepository::new();
        let first = repo.upsert_lexeme(NewLexeme::new("保存")).await.unwrap();
        let again = repo.upsert_lexeme(NewLexeme::new("  保存 ")).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(repo.lexemes().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_pages_by_id() {
        let repo = MemoryRepository::new();
        for text in ["a", "b", "c", "d", "e"] {
            repo.upsert_lexeme(NewLexeme::new(text)).await.unwrap();
        }

        let first = repo.scan_lexemes(LexemeStatus::Pending, None, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        let rest = repo
            .scan_lexemes(LexemeStatus::Pending, Some(first[1].id), 10)
            .await
            .unwrap();
        assert_eq!(rest.len(), 3);
        assert!(rest.iter().all(|lexeme| lexeme.id > first[1].id));
    }

    #[tokio::test]
    async fn test_transition_only_moves_matching_rows() {
        let repo = MemoryRepository::new();
        let a = repo.upsert_lexeme(NewLexeme::new("a")).await.unwrap();
        let b = repo.upsert_lexeme(NewLexeme::new("b")).await.unwrap();

        let claimed = repo
            .transition_lexemes(&[a.id], LexemeStatus::Pending, LexemeStatus::Processing)
            .await
            .unwrap();
        assert_eq!(claimed, vec![a.id]);

        let second = repo
            .transition_lexemes(&[a.id, b.id], LexemeStatus::Pending, LexemeStatus::Processing)
            .await
            .unwrap();
        assert_eq!(second, vec![b.id]);

        let done = repo
            .transition_lexemes(&[a.id], LexemeStatus::Processing, LexemeStatus::Succeeded)
            .await
            .unwrap();
        assert_eq!(done, vec![a.id]);
        let loaded = repo.load_lexemes(&[a.id]).await.unwrap();
        assert!(loaded[0].processed_at.is_some());
    }

    #[tokio::test]
    async fn test_run_lifecycle_is_monotonic() {
        let repo = MemoryRepository::new();
        let run = repo.create_run("identity").await.unwrap();

        assert!(repo.start_run(run.id).await.unwrap());
        assert!(!repo.start_run(run.id).await.unwrap());
        assert!(
            repo.close_run(run.id, RunStatus::Done, &serde_json::json!({"total": 0}))
                .await
                .unwrap()
        );
        assert!(!repo.fail_run(run.id, "late failure").await.unwrap());

        let closed = repo.get_run(run.id).await.unwrap().unwrap();
        assert_eq!(closed.status, RunStatus::Done);
        assert!(closed.error.is_none());
        assert!(closed.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_soft_deleted_runs_are_missing() {
        let repo = MemoryRepository::new();
        let run = repo.create_run("identity").await.unwrap();
        assert!(repo.soft_delete_run(run.id).await.unwrap());
        assert!(repo.get_run(run.id).await.unwrap().is_none());
        assert!(!repo.start_run(run.id).await.unwrap());
        assert!(repo.raw_run(run.id).unwrap().deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_result_upsert_overwrites() {
        let repo = MemoryRepository::new();
        let output = |text: &str| ProcessOutput {
            lexeme_id: 5,
            output: serde_json::json!(text),
            metadata: serde_json::Value::Null,
        };
        repo.upsert_result(1, &output("first")).await.unwrap();
        repo.upsert_result(1, &output("second")).await.unwrap();
        repo.upsert_result(2, &output("other run")).await.unwrap();

        let results = repo.results_for_run(1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].output, serde_json::json!("second"));
    }

    #[tokio::test]
    async fn test_reviews_cascade_with_occurrence() {
        let repo = MemoryRepository::new();
        let lexeme = repo.upsert_lexeme(NewLexeme::new("你好")).await.unwrap();
        let record = repo.create_repository("app", "/tmp/app").unwrap();
        let file = repo.create_source_file(record.id, "src/main.py").unwrap();
        let occurrence = repo
            .create_occurrence(NewOccurrence {
                lexeme_id: lexeme.id,
                file_id: file.id,
                line_at: 1,
                start: 0,
                end: 2,
                matched_text: "你好".to_string(),
            })
            .unwrap();
        let review = repo.create_review(occurrence.id, Some("hello")).unwrap();

        let context = repo.review_context(review.id).await.unwrap().unwrap();
        assert_eq!(context.repository.unwrap().name, "app");
        assert_eq!(repo.reviews_for_file(file.id).await.unwrap().len(), 1);

        assert!(repo.delete_occurrence(occurrence.id));
        assert!(repo.review(review.id).is_none());
        assert!(repo.reviews_for_file(file.id).await.unwrap().is_empty());
    }
}
