use crate::core::models::*;
use crate::utils::error::{PipelineError, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use tracing::debug;

use super::super::entities;
use super::super::entities::{lexeme, process_result};
use super::types::{SeaOrmDatabase, db_id, db_ids, now};

impl SeaOrmDatabase {
    /// Insert a lexeme unless its fingerprint exists, then return the stored row
    pub async fn insert_lexeme(&self, new: NewLexeme) -> Result<Lexeme> {
        let fingerprint = new.fingerprint();
        debug!("Upserting lexeme {}", fingerprint);

        let active_model = lexeme::ActiveModel {
            fingerprint: Set(fingerprint.clone()),
            source_text: Set(new.source_text),
            normalized_text: Set(new.normalized_text),
            status: Set(LexemeStatus::Pending.as_str().to_string()),
            processed_at: Set(None),
            metadata: Set(new.metadata),
            created_at: Set(now()),
            ..Default::default()
        };

        entities::Lexeme::insert(active_model)
            .on_conflict(
                OnConflict::column(lexeme::Column::Fingerprint)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(PipelineError::Database)?;

        let model = entities::Lexeme::find()
            .filter(lexeme::Column::Fingerprint.eq(fingerprint.as_str()))
            .one(&self.db)
            .await
            .map_err(PipelineError::Database)?
            .ok_or_else(|| PipelineError::internal("lexeme vanished after insert"))?;

        model.try_into()
    }

    /// Keyset page of lexemes in a status
    pub async fn find_lexemes_by_status(
        &self,
        status: LexemeStatus,
        after_id: Option<i64>,
        limit: u64,
    ) -> Result<Vec<Lexeme>> {
        let mut query = entities::Lexeme::find().filter(lexeme::Column::Status.eq(status.as_str()));
        if let Some(after_id) = after_id {
            query = query.filter(lexeme::Column::Id.gt(db_id(after_id)?));
        }

        query
            .order_by_asc(lexeme::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(PipelineError::Database)?
            .into_iter()
            .map(Lexeme::try_from)
            .collect()
    }

    pub async fn find_lexemes(&self, ids: &[i64]) -> Result<Vec<Lexeme>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        entities::Lexeme::find()
            .filter(lexeme::Column::Id.is_in(db_ids(ids)?))
            .order_by_asc(lexeme::Column::Id)
            .all(&self.db)
            .await
            .map_err(PipelineError::Database)?
            .into_iter()
            .map(Lexeme::try_from)
            .collect()
    }

    /// Single conditional `UPDATE .. RETURNING`; only rows still in `from` move
    pub async fn update_lexeme_status(
        &self,
        ids: &[i64],
        from: LexemeStatus,
        to: LexemeStatus,
    ) -> Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut update = entities::Lexeme::update_many()
            .col_expr(lexeme::Column::Status, Expr::value(to.as_str()))
            .filter(lexeme::Column::Id.is_in(db_ids(ids)?))
            .filter(lexeme::Column::Status.eq(from.as_str()));
        if matches!(to, LexemeStatus::Succeeded | LexemeStatus::Failed) {
            update = update.col_expr(lexeme::Column::ProcessedAt, Expr::value(now()));
        }

        let updated = update
            .exec_with_returning(&self.db)
            .await
            .map_err(PipelineError::Database)?;

        let mut moved: Vec<i64> = updated.into_iter().map(|model| i64::from(model.id)).collect();
        moved.sort_unstable();
        debug!("Moved {} of {} lexemes {} -> {}", moved.len(), ids.len(), from, to);
        Ok(moved)
    }

    /// Insert or overwrite the (run, lexeme) result row
    pub async fn save_result(&self, run_id: i64, output: &ProcessOutput) -> Result<()> {
        let active_model = process_result::ActiveModel {
            run_id: Set(db_id(run_id)?),
            lexeme_id: Set(db_id(output.lexeme_id)?),
            output: Set(output.output.clone()),
            metadata: Set(output.metadata.clone()),
            updated_at: Set(now()),
            ..Default::default()
        };

        entities::ProcessResult::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    process_result::Column::RunId,
                    process_result::Column::LexemeId,
                ])
                .update_columns([
                    process_result::Column::Output,
                    process_result::Column::Metadata,
                    process_result::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        Ok(())
    }

    pub async fn find_results(&self, run_id: i64) -> Result<Vec<ProcessResult>> {
        let results = entities::ProcessResult::find()
            .filter(process_result::Column::RunId.eq(db_id(run_id)?))
            .order_by_asc(process_result::Column::LexemeId)
            .all(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        Ok(results.into_iter().map(ProcessResult::from).collect())
    }
}
