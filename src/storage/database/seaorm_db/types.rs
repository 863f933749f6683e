use crate::core::models::*;
use crate::utils::error::{PipelineError, Result};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::DatabaseConnection;

use super::super::entities;

/// SeaORM-based database implementation
#[derive(Debug, Clone)]
pub struct SeaOrmDatabase {
    pub(super) db: DatabaseConnection,
    /// Backend type indicator
    pub(super) backend_type: DatabaseBackendType,
}

/// Database backend type indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    PostgreSQL,
    SQLite,
}

/// Domain ids are i64; table keys are 32-bit integers
pub(super) fn db_id(id: i64) -> Result<i32> {
    i32::try_from(id).map_err(|_| PipelineError::validation(format!("id out of range: {}", id)))
}

pub(super) fn db_ids(ids: &[i64]) -> Result<Vec<i32>> {
    ids.iter().map(|id| db_id(*id)).collect()
}

pub(super) fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

fn utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

impl TryFrom<entities::lexeme::Model> for Lexeme {
    type Error = PipelineError;

    fn try_from(model: entities::lexeme::Model) -> Result<Self> {
        Ok(Self {
            id: i64::from(model.id),
            fingerprint: model.fingerprint,
            source_text: model.source_text,
            normalized_text: model.normalized_text,
            status: model.status.parse()?,
            processed_at: model.processed_at.map(utc),
            metadata: model.metadata,
        })
    }
}

impl TryFrom<entities::process_run::Model> for ProcessRun {
    type Error = PipelineError;

    fn try_from(model: entities::process_run::Model) -> Result<Self> {
        Ok(Self {
            id: i64::from(model.id),
            processor: model.processor,
            status: model.status.parse()?,
            created_at: utc(model.created_at),
            started_at: model.started_at.map(utc),
            finished_at: model.finished_at.map(utc),
            final_progress: model.final_progress,
            error: model.error,
            deleted_at: model.deleted_at.map(utc),
        })
    }
}

impl From<entities::process_result::Model> for ProcessResult {
    fn from(model: entities::process_result::Model) -> Self {
        Self {
            run_id: i64::from(model.run_id),
            lexeme_id: i64::from(model.lexeme_id),
            output: model.output,
            metadata: model.metadata,
            updated_at: utc(model.updated_at),
        }
    }
}

impl From<entities::repository::Model> for RepositoryRecord {
    fn from(model: entities::repository::Model) -> Self {
        Self {
            id: i64::from(model.id),
            name: model.name,
            local_path: model.local_path,
        }
    }
}

impl From<entities::source_file::Model> for SourceFile {
    fn from(model: entities::source_file::Model) -> Self {
        Self {
            id: i64::from(model.id),
            repository_id: i64::from(model.repository_id),
            path: model.path,
        }
    }
}

impl From<entities::occurrence::Model> for Occurrence {
    fn from(model: entities::occurrence::Model) -> Self {
        Self {
            id: i64::from(model.id),
            lexeme_id: i64::from(model.lexeme_id),
            file_id: i64::from(model.file_id),
            line_at: i64::from(model.line_at),
            start: i64::from(model.start_offset),
            end: i64::from(model.end_offset),
            matched_text: model.matched_text,
        }
    }
}

impl TryFrom<entities::occurrence_review::Model> for OccurrenceReview {
    type Error = PipelineError;

    fn try_from(model: entities::occurrence_review::Model) -> Result<Self> {
        Ok(Self {
            id: i64::from(model.id),
            occurrence_id: i64::from(model.occurrence_id),
            status: model.status.parse()?,
            apply_status: model.apply_status.parse()?,
            replacement: model.replacement,
            apply_error: model.apply_error,
            applied_at: model.applied_at.map(utc),
        })
    }
}
