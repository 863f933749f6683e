//! Aggregate progress of a run

use serde::{Deserialize, Serialize};

/// Aggregate computed purely from a run's counters.
///
/// The same shape is broadcast while a run is live and persisted onto the
/// run record when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub run_id: i64,
    pub total: i64,
    pub succeeded: i64,
    pub failed: i64,
    pub processed: i64,
    /// processed / total in [0, 100], two decimals. An empty run is complete.
    pub percent: f64,
    pub batches_total: i64,
    pub batches_done: i64,
}

impl ProgressPayload {
    pub fn from_counts(
        run_id: i64,
        total: i64,
        succeeded: i64,
        failed: i64,
        batches_total: i64,
        batches_done: i64,
    ) -> Self {
        let processed = succeeded + failed;
        Self {
            run_id,
            total,
            succeeded,
            failed,
            processed,
            percent: percent(processed, total),
            batches_total,
            batches_done,
        }
    }

    /// True once every planned batch has reported
    pub fn batches_complete(&self) -> bool {
        self.batches_total <= 0 || self.batches_done >= self.batches_total
    }
}

fn percent(processed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 100.0;
    }
    let raw = (processed as f64 / total as f64) * 100.0;
    (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounding_and_clamp() {
        assert_eq!(ProgressPayload::from_counts(1, 3, 1, 0, 1, 0).percent, 33.33);
        assert_eq!(ProgressPayload::from_counts(1, 3, 2, 0, 1, 0).percent, 66.67);
        assert_eq!(ProgressPayload::from_counts(1, 10, 7, 3, 2, 2).percent, 100.0);
        assert_eq!(ProgressPayload::from_counts(1, 2, 5, 0, 1, 1).percent, 100.0);
        assert_eq!(ProgressPayload::from_counts(1, 0, 0, 0, 0, 0).percent, 100.0);
    }

    #[test]
    fn test_processed_and_batches() {
        let payload = ProgressPayload::from_counts(4, 10, 7, 3, 3, 2);
        assert_eq!(payload.processed, 10);
        assert!(!payload.batches_complete());
        assert!(ProgressPayload::from_counts(4, 0, 0, 0, 0, 0).batches_complete());
    }
}
