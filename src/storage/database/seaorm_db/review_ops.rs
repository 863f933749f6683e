use crate::core::models::*;
use crate::utils::error::{PipelineError, Result};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::debug;

use super::super::entities;
use super::super::entities::{occurrence, occurrence_review, repository, source_file};
use super::types::{SeaOrmDatabase, db_id, now};

fn db_i32(value: i64, field: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| PipelineError::validation(format!("{} out of range: {}", field, value)))
}

impl SeaOrmDatabase {
    pub async fn create_repository(&self, name: &str, local_path: &str) -> Result<RepositoryRecord> {
        let model = repository::ActiveModel {
            name: Set(name.to_string()),
            local_path: Set(local_path.to_string()),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(PipelineError::Database)?;
        Ok(model.into())
    }

    pub async fn create_source_file(&self, repository_id: i64, path: &str) -> Result<SourceFile> {
        let model = source_file::ActiveModel {
            repository_id: Set(db_id(repository_id)?),
            path: Set(path.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(PipelineError::Database)?;
        Ok(model.into())
    }

    pub async fn create_occurrence(&self, new: NewOccurrence) -> Result<Occurrence> {
        let model = occurrence::ActiveModel {
            lexeme_id: Set(db_id(new.lexeme_id)?),
            file_id: Set(db_id(new.file_id)?),
            line_at: Set(db_i32(new.line_at, "line_at")?),
            start_offset: Set(db_i32(new.start, "start")?),
            end_offset: Set(db_i32(new.end, "end")?),
            matched_text: Set(new.matched_text),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(PipelineError::Database)?;
        Ok(model.into())
    }

    /// Surface an occurrence for review
    pub async fn create_review(
        &self,
        occurrence_id: i64,
        replacement: Option<&str>,
    ) -> Result<OccurrenceReview> {
        let model = occurrence_review::ActiveModel {
            occurrence_id: Set(db_id(occurrence_id)?),
            status: Set(ReviewStatus::Pending.as_str().to_string()),
            apply_status: Set(ApplyStatus::NotApplied.as_str().to_string()),
            replacement: Set(replacement.map(str::to_string)),
            apply_error: Set(None),
            applied_at: Set(None),
            updated_at: Set(now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(PipelineError::Database)?;
        model.try_into()
    }

    pub async fn find_review_context(&self, review_id: i64) -> Result<Option<ReviewContext>> {
        let Some(review) = entities::OccurrenceReview::find_by_id(db_id(review_id)?)
            .one(&self.db)
            .await
            .map_err(PipelineError::Database)?
        else {
            return Ok(None);
        };

        let occurrence = entities::Occurrence::find_by_id(review.occurrence_id)
            .one(&self.db)
            .await
            .map_err(PipelineError::Database)?;

        let file = match &occurrence {
            Some(occurrence) => entities::SourceFile::find_by_id(occurrence.file_id)
                .one(&self.db)
                .await
                .map_err(PipelineError::Database)?,
            None => None,
        };

        let repository = match &file {
            Some(file) => entities::Repository::find_by_id(file.repository_id)
                .one(&self.db)
                .await
                .map_err(PipelineError::Database)?,
            None => None,
        };

        Ok(Some(ReviewContext {
            review: review.try_into()?,
            occurrence: occurrence.map(Occurrence::from),
            file: file.map(SourceFile::from),
            repository: repository.map(RepositoryRecord::from),
        }))
    }

    pub async fn update_apply_status(
        &self,
        review_id: i64,
        status: ApplyStatus,
        error: Option<&str>,
    ) -> Result<()> {
        let mut update = entities::OccurrenceReview::update_many()
            .col_expr(occurrence_review::Column::ApplyStatus, Expr::value(status.as_str()))
            .col_expr(
                occurrence_review::Column::ApplyError,
                Expr::value(error.map(str::to_string)),
            )
            .col_expr(occurrence_review::Column::UpdatedAt, Expr::value(now()));
        if status == ApplyStatus::Applied {
            update = update.col_expr(occurrence_review::Column::AppliedAt, Expr::value(now()));
        }

        let result = update
            .filter(occurrence_review::Column::Id.eq(db_id(review_id)?))
            .exec(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        if result.rows_affected == 0 {
            return Err(PipelineError::not_found(format!("review {}", review_id)));
        }

        debug!("Review {} apply status -> {}", review_id, status);
        Ok(())
    }

    pub async fn update_review_status(&self, review_id: i64, status: ReviewStatus) -> Result<()> {
        let result = entities::OccurrenceReview::update_many()
            .col_expr(occurrence_review::Column::Status, Expr::value(status.as_str()))
            .col_expr(occurrence_review::Column::UpdatedAt, Expr::value(now()))
            .filter(occurrence_review::Column::Id.eq(db_id(review_id)?))
            .exec(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        if result.rows_affected == 0 {
            return Err(PipelineError::not_found(format!("review {}", review_id)));
        }
        Ok(())
    }

    pub async fn find_reviews_for_file(&self, file_id: i64) -> Result<Vec<OccurrenceReview>> {
        entities::OccurrenceReview::find()
            .inner_join(entities::Occurrence)
            .filter(occurrence::Column::FileId.eq(db_id(file_id)?))
            .order_by_asc(occurrence_review::Column::Id)
            .all(&self.db)
            .await
            .map_err(PipelineError::Database)?
            .into_iter()
            .map(OccurrenceReview::try_from)
            .collect()
    }

    pub async fn find_occurrences_for_file(&self, file_id: i64) -> Result<Vec<Occurrence>> {
        Ok(entities::Occurrence::find()
            .filter(occurrence::Column::FileId.eq(db_id(file_id)?))
            .order_by_asc(occurrence::Column::Id)
            .all(&self.db)
            .await
            .map_err(PipelineError::Database)?
            .into_iter()
            .map(Occurrence::from)
            .collect())
    }
}
