//! Aggregate progress and throttled broadcast

use super::core::Pipeline;
use super::keys::{Counter, RunKeys};
use crate::core::models::ProgressPayload;
use crate::storage::broadcast::RunEvent;
use crate::storage::counters::claim_window;
use crate::utils::error::Result;
use futures::future::try_join_all;
use tracing::{debug, warn};

impl Pipeline {
    /// Recompute the aggregate purely from the run's counters; absent
    /// counters read as zero.
    pub async fn read_progress(&self, run_id: i64) -> Result<ProgressPayload> {
        let keys = RunKeys::new(run_id);
        let names = Counter::ALL.map(|counter| keys.counter(counter));
        let values =
            try_join_all(names.iter().map(|name| self.counters.read(name))).await?;
        let [total, succeeded, failed, batches_total, batches_done] =
            [0, 1, 2, 3, 4].map(|i| values[i].unwrap_or(0));
        Ok(ProgressPayload::from_counts(
            run_id,
            total,
            succeeded,
            failed,
            batches_total,
            batches_done,
        ))
    }

    /// Publish a progress event, at most once per throttle window per run.
    ///
    /// Never fails: errors are logged and dropped. Returns whether an event
    /// went out.
    pub async fn broadcast_progress(&self, run_id: i64) -> bool {
        match self.try_broadcast_progress(run_id).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!("Run {}: progress broadcast failed: {}", run_id, e);
                false
            }
        }
    }

    async fn try_broadcast_progress(&self, run_id: i64) -> Result<bool> {
        let Some(run) = self.repository.get_run(run_id).await? else {
            return Ok(false);
        };
        if run.is_terminal() {
            return Ok(false);
        }

        let keys = RunKeys::new(run_id);
        let window = self.settings.progress_throttle();
        if !claim_window(self.counters.as_ref(), &keys.progress_throttle(), window).await? {
            debug!("Run {}: progress broadcast throttled", run_id);
            return Ok(false);
        }

        let payload = self.read_progress(run_id).await?;
        self.broadcaster
            .publish(keys.channel(), &RunEvent::progress(payload))
            .await?;
        Ok(true)
    }
}
