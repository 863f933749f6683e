use crate::core::models::*;
use crate::utils::error::{PipelineError, Result};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{debug, info};

use super::super::entities;
use super::super::entities::process_run;
use super::types::{SeaOrmDatabase, db_id, now};

/// Statuses a run may still leave
fn open_statuses() -> [&'static str; 2] {
    [RunStatus::Pending.as_str(), RunStatus::Running.as_str()]
}

impl SeaOrmDatabase {
    pub async fn insert_run(&self, processor: &str) -> Result<ProcessRun> {
        let active_model = process_run::ActiveModel {
            processor: Set(processor.to_string()),
            status: Set(RunStatus::Pending.as_str().to_string()),
            created_at: Set(now()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        info!("Created run {} for processor {}", model.id, processor);
        model.try_into()
    }

    /// A live (not soft-deleted) run
    pub async fn find_run(&self, run_id: i64) -> Result<Option<ProcessRun>> {
        entities::ProcessRun::find_by_id(db_id(run_id)?)
            .filter(process_run::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(PipelineError::Database)?
            .map(ProcessRun::try_from)
            .transpose()
    }

    pub async fn mark_run_started(&self, run_id: i64) -> Result<bool> {
        let result = entities::ProcessRun::update_many()
            .col_expr(process_run::Column::Status, Expr::value(RunStatus::Running.as_str()))
            .col_expr(process_run::Column::StartedAt, Expr::value(now()))
            .filter(process_run::Column::Id.eq(db_id(run_id)?))
            .filter(process_run::Column::Status.eq(RunStatus::Pending.as_str()))
            .filter(process_run::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        Ok(result.rows_affected == 1)
    }

    /// Terminal transition, guarded on the run still being open
    pub async fn mark_run_closed(
        &self,
        run_id: i64,
        status: RunStatus,
        final_progress: Option<serde_json::Value>,
        error: Option<&str>,
    ) -> Result<bool> {
        if !status.is_terminal() {
            return Err(PipelineError::validation(format!(
                "cannot close run {} as {}",
                run_id, status
            )));
        }

        let mut update = entities::ProcessRun::update_many()
            .col_expr(process_run::Column::Status, Expr::value(status.as_str()))
            .col_expr(process_run::Column::FinishedAt, Expr::value(now()));
        if let Some(final_progress) = final_progress {
            update = update.col_expr(process_run::Column::FinalProgress, Expr::value(final_progress));
        }
        if let Some(error) = error {
            update = update.col_expr(process_run::Column::Error, Expr::value(error));
        }

        let result = update
            .filter(process_run::Column::Id.eq(db_id(run_id)?))
            .filter(process_run::Column::Status.is_in(open_statuses()))
            .filter(process_run::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(PipelineError::Database)?;

        debug!("Close run {} as {}: {} row(s)", run_id, status, result.rows_affected);
        Ok(result.rows_affected == 1)
    }

    pub async fn mark_run_deleted(&self, run_id: i64) -> Result<bool> {
        let result = entities::ProcessRun::update_many()
            .col_expr(process_run::Column::DeletedAt, Expr::value(now()))
            .filter(process_run::Column::Id.eq(db_id(run_id)?))
            .filter(process_run::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(PipelineError::Database)?;
        Ok(result.rows_affected == 1)
    }
}
