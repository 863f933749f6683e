//! Finalizer: the lock-guarded terminal transition of a run

use super::core::Pipeline;
use super::keys::RunKeys;
use crate::core::models::{ProgressPayload, RunStatus};
use crate::storage::broadcast::RunEvent;
use crate::storage::counters::NamedLock;
use crate::utils::error::Result;
use tracing::{debug, info, warn};

/// What a finalize invocation did
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// Run missing or already terminal
    Skipped,
    /// Another finalize holds the lock
    Busy,
    /// Not every batch has reported yet
    Deferred,
    /// Closed by this call
    Closed {
        status: RunStatus,
        payload: ProgressPayload,
    },
}

impl Pipeline {
    /// Close a run once every batch has reported.
    ///
    /// Safe to call any number of times concurrently: the per-run lock lets
    /// one caller in, and the conditional close lets one caller win.
    pub async fn finalize(&self, run_id: i64) -> Result<FinalizeOutcome> {
        let Some(run) = self.repository.get_run(run_id).await? else {
            debug!("Run {}: gone, nothing to finalize", run_id);
            return Ok(FinalizeOutcome::Skipped);
        };
        if run.is_terminal() {
            debug!("Run {}: already {}", run_id, run.status);
            return Ok(FinalizeOutcome::Skipped);
        }

        let keys = RunKeys::new(run_id);
        let Some(lock) = NamedLock::try_acquire(
            self.counters.clone(),
            keys.finalize_lock(),
            self.settings.finalize_lock_ttl(),
        )
        .await?
        else {
            debug!("Run {}: finalize already in progress", run_id);
            return Ok(FinalizeOutcome::Busy);
        };

        let outcome = self.finalize_locked(run_id, &keys).await;

        if let Err(e) = lock.release().await {
            warn!("Run {}: could not release finalize lock: {}", run_id, e);
        }
        outcome
    }

    async fn finalize_locked(&self, run_id: i64, keys: &RunKeys) -> Result<FinalizeOutcome> {
        let payload = self.read_progress(run_id).await?;
        if !payload.batches_complete() {
            debug!(
                "Run {}: {}/{} batches done, deferring finalize",
                run_id, payload.batches_done, payload.batches_total
            );
            return Ok(FinalizeOutcome::Deferred);
        }

        let status = if payload.failed > 0 {
            RunStatus::Failed
        } else {
            RunStatus::Done
        };
        let final_progress = serde_json::to_value(payload)?;
        if !self
            .repository
            .close_run(run_id, status, &final_progress)
            .await?
        {
            debug!("Run {}: closed elsewhere", run_id);
            return Ok(FinalizeOutcome::Skipped);
        }

        info!(
            "Run {}: {} ({} succeeded, {} failed of {})",
            run_id, status, payload.succeeded, payload.failed, payload.total
        );
        // the run is already closed, so the task must not fail from here on
        if let Err(e) = self
            .broadcaster
            .publish(keys.channel(), &RunEvent::final_event(payload))
            .await
        {
            warn!("Run {}: final broadcast failed: {}", run_id, e);
        }

        Ok(FinalizeOutcome::Closed { status, payload })
    }
}
