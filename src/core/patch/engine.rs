//! Review application

use super::splice::{Span, SpliceOutcome, splice};
use crate::config::VcsConfig;
use crate::core::models::{ApplyStatus, Occurrence, OccurrenceReview, ReviewContext, ReviewStatus};
use crate::storage::counters::{CounterStore, NamedLock};
use crate::storage::repository::ReviewRepository;
use crate::utils::error::{PipelineError, Result};
use crate::vcs::{VcsClient, VcsProvider};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

const LOCK_POLL: Duration = Duration::from_millis(20);

/// Structured result of applying one review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyReport {
    pub review_id: i64,
    /// True once the file write happened, whatever stage and commit did
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
    pub committed: bool,
    /// Apply status recorded for the review, if any was recorded
    pub apply_status: Option<ApplyStatus>,
    /// Nothing was attempted because another apply held the file
    pub retryable: bool,
}

impl ApplyReport {
    fn new(review_id: i64) -> Self {
        Self {
            review_id,
            success: false,
            message: String::new(),
            errors: Vec::new(),
            committed: false,
            apply_status: None,
            retryable: false,
        }
    }

    fn rejected(mut self, message: impl Into<String>, errors: Vec<String>) -> Self {
        self.message = message.into();
        self.errors = errors;
        self
    }
}

/// What a review's associations and fields resolve to
enum Resolution {
    Ready(Target),
    /// Associations that do not exist; nothing may be mutated
    Missing(Vec<String>),
    /// A problem to record as `failed` on the review
    Invalid(String),
}

struct Target {
    client: Arc<dyn VcsClient>,
    repository_name: String,
    occurrence_id: i64,
    file_id: i64,
    /// Per-file lock, keyed on the repository and the cleaned path
    lock_key: String,
    relative_path: String,
    absolute_path: PathBuf,
    span: Span,
    expected: String,
    replacement: String,
}

/// Applies reviews to working trees.
///
/// Applies to the same file are serialized through a named lock in the
/// counter store, so every read-splice-write sees the previous apply's write.
#[derive(Clone)]
pub struct PatchEngine {
    reviews: Arc<dyn ReviewRepository>,
    vcs: Arc<dyn VcsProvider>,
    locks: Arc<dyn CounterStore>,
    lock_ttl: Duration,
    lock_wait: Duration,
}

impl PatchEngine {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        vcs: Arc<dyn VcsProvider>,
        locks: Arc<dyn CounterStore>,
        config: &VcsConfig,
    ) -> Self {
        Self {
            reviews,
            vcs,
            locks,
            lock_ttl: config.file_lock_ttl(),
            lock_wait: config.file_lock_wait(),
        }
    }

    /// Apply one review.
    ///
    /// Missing associations are reported without touching anything. Bad
    /// positions, unsafe paths and unreadable files record `failed`; a span
    /// that no longer holds the scanned text records `conflict`. Stage and
    /// commit failures are reported in `errors` but leave the write in place.
    /// A file still locked by another apply after the wait yields a
    /// `retryable` report and no mutation.
    pub async fn apply(&self, review_id: i64) -> Result<ApplyReport> {
        let report = ApplyReport::new(review_id);

        let Some(context) = self.reviews.review_context(review_id).await? else {
            return Err(PipelineError::not_found(format!("review {}", review_id)));
        };

        let target = match self.resolve(&context) {
            Resolution::Ready(target) => target,
            Resolution::Invalid(problem) => return self.record_failure(report, problem).await,
            Resolution::Missing(missing) => {
                warn!("Review {}: missing associations: {}", review_id, missing.join(", "));
                return Ok(report.rejected("missing associations", missing));
            }
        };

        let Some(lock) = self.lock_file(&target.lock_key).await? else {
            warn!("Review {}: {} stayed busy", review_id, target.relative_path);
            let mut report = report.rejected(
                "file busy, retry later",
                vec![format!("{} is being patched by another apply", target.relative_path)],
            );
            report.retryable = true;
            return Ok(report);
        };

        let outcome = self.apply_locked(report, &target).await;

        if let Err(e) = lock.release().await {
            warn!("Review {}: could not release {}: {}", review_id, target.lock_key, e);
        }
        outcome
    }

    /// Wait up to `lock_wait` for the file's lock
    async fn lock_file(&self, key: &str) -> Result<Option<NamedLock>> {
        let deadline = Instant::now() + self.lock_wait;
        loop {
            if let Some(lock) =
                NamedLock::try_acquire(self.locks.clone(), key, self.lock_ttl).await?
            {
                return Ok(Some(lock));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(LOCK_POLL).await;
        }
    }

    async fn apply_locked(&self, report: ApplyReport, target: &Target) -> Result<ApplyReport> {
        let review_id = report.review_id;

        let siblings = self.reviews.reviews_for_file(target.file_id).await?;
        if siblings
            .iter()
            .any(|review| review.id == review_id && review.apply_status == ApplyStatus::Applied)
        {
            debug!("Review {}: already applied", review_id);
            let mut report = report;
            report.success = true;
            report.apply_status = Some(ApplyStatus::Applied);
            self.reviews
                .set_review_status(review_id, ReviewStatus::Approved)
                .await?;
            self.publish(target, &mut report).await;
            return Ok(report);
        }
        let occurrences = self.reviews.occurrences_for_file(target.file_id).await?;
        let span = rebase_span(target.span, target.occurrence_id, &siblings, &occurrences);
        if span != target.span {
            debug!(
                "Review {}: span shifted by {} for earlier edits on line {}",
                review_id,
                span.start - target.span.start,
                span.line_at
            );
        }

        let content = match tokio::fs::read_to_string(&target.absolute_path).await {
            Ok(content) => content,
            Err(e) => {
                let problem = format!("cannot read {}: {}", target.relative_path, e);
                return self.record_failure(report, problem).await;
            }
        };

        let updated = match splice(&content, span, &target.expected, &target.replacement) {
            SpliceOutcome::Applied(updated) => updated,
            SpliceOutcome::Invalid(problem) => return self.record_failure(report, problem).await,
            SpliceOutcome::Conflict { expected, actual } => {
                let problem = match actual {
                    Some(actual) => format!(
                        "{} line {}: expected {:?}, found {:?}",
                        target.relative_path, span.line_at, expected, actual
                    ),
                    None => format!(
                        "{} line {}: expected {:?}, span no longer exists",
                        target.relative_path, span.line_at, expected
                    ),
                };
                info!("Review {}: conflict, {}", review_id, problem);
                self.reviews
                    .set_apply_status(review_id, ApplyStatus::Conflict, Some(&problem))
                    .await?;
                let mut report = report.rejected("file changed since scan", vec![problem]);
                report.apply_status = Some(ApplyStatus::Conflict);
                return Ok(report);
            }
        };

        if let Err(e) = write_atomic(&target.absolute_path, &updated).await {
            let problem = format!("cannot write {}: {}", target.relative_path, e);
            return self.record_failure(report, problem).await;
        }
        info!("Review {}: applied to {}", review_id, target.relative_path);

        self.reviews
            .set_apply_status(review_id, ApplyStatus::Applied, None)
            .await?;
        self.reviews
            .set_review_status(review_id, ReviewStatus::Approved)
            .await?;

        let mut report = report;
        report.success = true;
        report.apply_status = Some(ApplyStatus::Applied);
        self.publish(target, &mut report).await;
        Ok(report)
    }

    /// Check associations, then the review's own fields
    fn resolve(&self, context: &ReviewContext) -> Resolution {
        let review_id = context.review.id;
        let mut missing = Vec::new();
        if context.occurrence.is_none() {
            missing.push(format!("review {} has no occurrence", review_id));
        }
        if context.file.is_none() {
            missing.push(format!("review {} has no source file", review_id));
        }
        if context.repository.is_none() {
            missing.push(format!("review {} has no repository", review_id));
        }
        let client = context
            .repository
            .as_ref()
            .and_then(|repository| self.vcs.client(repository));
        if context.repository.is_some() && client.is_none() {
            missing.push(format!("review {} has no usable VCS client", review_id));
        }

        let (Some(occurrence), Some(file), Some(repository), Some(client)) = (
            context.occurrence.as_ref(),
            context.file.as_ref(),
            context.repository.as_ref(),
            client,
        ) else {
            return Resolution::Missing(missing);
        };

        let replacement = match context.review.replacement.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => return Resolution::Invalid("replacement text is blank".to_string()),
        };

        let span = Span::new(occurrence.line_at, occurrence.start, occurrence.end);
        if let Some(problem) = span.check() {
            return Resolution::Invalid(problem);
        }

        let Some(relative) = safe_relative_path(&file.path) else {
            return Resolution::Invalid(format!("unsafe file path {:?}", file.path));
        };

        let lock_key = format!(
            "lexflow:patch:{}:{}",
            repository.id,
            relative.to_string_lossy()
        );
        Resolution::Ready(Target {
            client,
            repository_name: repository.name.clone(),
            occurrence_id: occurrence.id,
            file_id: file.id,
            lock_key,
            relative_path: file.path.clone(),
            absolute_path: Path::new(&repository.local_path).join(relative),
            span,
            expected: occurrence.matched_text.clone(),
            replacement,
        })
    }

    async fn record_failure(&self, report: ApplyReport, problem: String) -> Result<ApplyReport> {
        warn!("Review {}: apply failed: {}", report.review_id, problem);
        self.reviews
            .set_apply_status(report.review_id, ApplyStatus::Failed, Some(&problem))
            .await?;
        let mut report = report.rejected("apply failed", vec![problem]);
        report.apply_status = Some(ApplyStatus::Failed);
        Ok(report)
    }

    /// Stage the file and commit it when every review in it is approved
    async fn publish(&self, target: &Target, report: &mut ApplyReport) {
        let path = target.relative_path.as_str();

        if let Err(e) = target.client.stage(path).await {
            report.errors.push(format!("stage {}: {}", path, e));
            report.message = format!("applied to {}, staging failed", path);
            return;
        }

        let reviews = match self.reviews.reviews_for_file(target.file_id).await {
            Ok(reviews) => reviews,
            Err(e) => {
                report.errors.push(format!("list reviews for {}: {}", path, e));
                report.message = format!("applied and staged {}", path);
                return;
            }
        };

        let pending = reviews
            .iter()
            .filter(|review| review.status != ReviewStatus::Approved)
            .count();
        if pending > 0 {
            debug!("{}: {} reviews not yet approved", path, pending);
            report.message = format!(
                "applied and staged {}, {} of {} reviews still unapproved",
                path,
                pending,
                reviews.len()
            );
            return;
        }

        match target.client.has_pending_changes(path).await {
            Ok(true) => {}
            Ok(false) => {
                report.message = format!("applied {}, nothing to commit", path);
                return;
            }
            Err(e) => {
                report.errors.push(format!("status {}: {}", path, e));
                report.message = format!("applied and staged {}", path);
                return;
            }
        }

        let mut review_ids: Vec<i64> = reviews.iter().map(|review| review.id).collect();
        review_ids.sort_unstable();
        let message = commit_message(&target.repository_name, path, &review_ids);

        match target.client.commit(&message, path).await {
            Ok(()) => {
                info!("Committed {} with {} reviews", path, review_ids.len());
                report.committed = true;
                report.message = format!("applied and committed {}", path);
            }
            Err(e) => {
                report.errors.push(format!("commit {}: {}", path, e));
                report.message = format!("applied and staged {}, commit failed", path);
            }
        }
    }
}

/// Move `span` right by the length change of replacements already applied
/// earlier on the same line. Scan offsets describe the file as it was before
/// any of them.
fn rebase_span(
    span: Span,
    occurrence_id: i64,
    reviews: &[OccurrenceReview],
    occurrences: &[Occurrence],
) -> Span {
    let by_id: HashMap<i64, &Occurrence> = occurrences
        .iter()
        .map(|occurrence| (occurrence.id, occurrence))
        .collect();

    let shift: i64 = reviews
        .iter()
        .filter(|review| {
            review.apply_status == ApplyStatus::Applied && review.occurrence_id != occurrence_id
        })
        .filter_map(|review| {
            let occurrence = by_id.get(&review.occurrence_id)?;
            let replacement = review.replacement.as_deref()?;
            (occurrence.line_at == span.line_at && occurrence.end <= span.start)
                .then(|| replacement.chars().count() as i64 - (occurrence.end - occurrence.start))
        })
        .sum();

    Span::new(span.line_at, span.start + shift, span.end + shift)
}

fn commit_message(repository: &str, path: &str, review_ids: &[i64]) -> String {
    let ids: Vec<String> = review_ids.iter().map(|id| id.to_string()).collect();
    format!(
        "Apply approved replacements to {}\n\nRepository: {}\nReviews: {}\n",
        path,
        repository,
        ids.join(", ")
    )
}

/// `path` as a relative path that stays under the repository root
fn safe_relative_path(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        return None;
    }
    Some(clean)
}

/// Write through a temporary sibling and rename it over `path`
async fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.lexflow-{}.tmp", name, Uuid::new_v4()));

    let written = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        if let Ok(metadata) = tokio::fs::metadata(path).await {
            tokio::fs::set_permissions(&temp_path, metadata.permissions()).await?;
        }
        tokio::fs::rename(&temp_path, path).await
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(
            safe_relative_path("src/i18n/zh.py"),
            Some(PathBuf::from("src/i18n/zh.py"))
        );
        assert_eq!(safe_relative_path("./a.txt"), Some(PathBuf::from("a.txt")));
        assert_eq!(safe_relative_path("../outside.txt"), None);
        assert_eq!(safe_relative_path("src/../../outside.txt"), None);
        assert_eq!(safe_relative_path("/etc/passwd"), None);
        assert_eq!(safe_relative_path(""), None);
    }

    fn occurrence(id: i64, line_at: i64, start: i64, end: i64) -> Occurrence {
        Occurrence {
            id,
            lexeme_id: 1,
            file_id: 1,
            line_at,
            start,
            end,
            matched_text: String::new(),
        }
    }

    fn review(id: i64, occurrence_id: i64, status: ApplyStatus, replacement: &str) -> OccurrenceReview {
        OccurrenceReview {
            id,
            occurrence_id,
            status: ReviewStatus::Pending,
            apply_status: status,
            replacement: Some(replacement.to_string()),
            apply_error: None,
            applied_at: None,
        }
    }

    #[test]
    fn test_rebase_span_counts_applied_edits_to_the_left() {
        // t("文件", "编辑"): "文件" at [2,6), "编辑" at [8,12)
        let occurrences = vec![
            occurrence(1, 1, 2, 6),
            occurrence(2, 1, 8, 12),
            occurrence(3, 1, 14, 16),
            occurrence(4, 2, 0, 4),
        ];
        let target = Span::new(1, 14, 16);

        let reviews = vec![
            review(10, 1, ApplyStatus::Applied, "\"File\""),
            review(11, 2, ApplyStatus::NotApplied, "\"Edit\""),
            review(12, 4, ApplyStatus::Applied, "\"longer text\""),
        ];
        // only the applied edit on the same line and to the left moves it
        assert_eq!(
            rebase_span(target, 3, &reviews, &occurrences),
            Span::new(1, 16, 18)
        );

        let reviews = vec![
            review(10, 1, ApplyStatus::Applied, "\"File\""),
            review(11, 2, ApplyStatus::Applied, "\"E\""),
        ];
        assert_eq!(
            rebase_span(target, 3, &reviews, &occurrences),
            Span::new(1, 15, 17)
        );
        assert_eq!(rebase_span(Span::new(1, 2, 6), 1, &reviews, &occurrences), Span::new(1, 2, 6));
    }

    #[test]
    fn test_commit_message_lists_reviews() {
        let message = commit_message("web", "app/strings.py", &[3, 7, 9]);
        assert!(message.contains("app/strings.py"));
        assert!(message.contains("Repository: web"));
        assert!(message.contains("Reviews: 3, 7, 9"));
    }
}
