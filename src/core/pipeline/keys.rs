//! Counter store key layout for a run

/// The five progress counters of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Total,
    Succeeded,
    Failed,
    BatchesTotal,
    BatchesDone,
}

impl Counter {
    pub const ALL: [Counter; 5] = [
        Counter::Total,
        Counter::Succeeded,
        Counter::Failed,
        Counter::BatchesTotal,
        Counter::BatchesDone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Total => "total",
            Counter::Succeeded => "succeeded",
            Counter::Failed => "failed",
            Counter::BatchesTotal => "batches_total",
            Counter::BatchesDone => "batches_done",
        }
    }
}

/// Keys and channel of one run, all under `lexflow:run:{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunKeys {
    prefix: String,
}

impl RunKeys {
    pub fn new(run_id: i64) -> Self {
        Self {
            prefix: format!("lexflow:run:{}", run_id),
        }
    }

    pub fn counter(&self, counter: Counter) -> String {
        format!("{}:{}", self.prefix, counter.as_str())
    }

    pub fn finalize_lock(&self) -> String {
        format!("{}:finalize_lock", self.prefix)
    }

    pub fn progress_throttle(&self) -> String {
        format!("{}:progress_throttle", self.prefix)
    }

    /// Marker written once when batch `index` completes
    pub fn batch_done(&self, index: usize) -> String {
        format!("{}:batch:{}:done", self.prefix, index)
    }

    /// Broadcast channel name
    pub fn channel(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = RunKeys::new(42);
        assert_eq!(keys.counter(Counter::BatchesDone), "lexflow:run:42:batches_done");
        assert_eq!(keys.finalize_lock(), "lexflow:run:42:finalize_lock");
        assert_eq!(keys.batch_done(3), "lexflow:run:42:batch:3:done");
        assert_eq!(keys.channel(), "lexflow:run:42");
        assert_ne!(keys.counter(Counter::Total), RunKeys::new(4).counter(Counter::Total));
    }
}
