//! Occurrences, their reviews, and the files and repositories they live in

use super::status::{ApplyStatus, ReviewStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository checked out on local disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: i64,
    pub name: String,
    /// Working tree root
    pub local_path: String,
}

/// A tracked file inside a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: i64,
    pub repository_id: i64,
    /// Path relative to the repository root
    pub path: String,
}

/// Where a lexeme was found. Immutable once scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: i64,
    pub lexeme_id: i64,
    pub file_id: i64,
    /// 1-based line number
    pub line_at: i64,
    /// 0-based char offset into the line
    pub start: i64,
    /// Exclusive char offset into the line
    pub end: i64,
    /// Text the scanner saw in `[start, end)`
    pub matched_text: String,
}

/// Input for recording a scanned occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct NewOccurrence {
    pub lexeme_id: i64,
    pub file_id: i64,
    pub line_at: i64,
    pub start: i64,
    pub end: i64,
    pub matched_text: String,
}

/// Mutable review wrapper around an occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceReview {
    pub id: i64,
    pub occurrence_id: i64,
    pub status: ReviewStatus,
    pub apply_status: ApplyStatus,
    /// Candidate replacement text
    pub replacement: Option<String>,
    pub apply_error: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
}

/// A review with every association the patch engine needs, each possibly missing
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewContext {
    pub review: OccurrenceReview,
    pub occurrence: Option<Occurrence>,
    pub file: Option<SourceFile>,
    pub repository: Option<RepositoryRecord>,
}
