//! Per-item result persistence for one batch

use crate::core::models::{LexemeStatus, ProcessOutput};
use crate::storage::counters::CounterStore;
use crate::storage::repository::WorkItemRepository;
use crate::utils::error::Result;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Writes outputs for the lexemes a batch still owns.
///
/// Each recorded output is upserted, its lexeme moved `processing -> succeeded`,
/// and the success counter bumped only when that move actually happened.
pub struct ResultWriter<'a> {
    run_id: i64,
    repository: &'a dyn WorkItemRepository,
    counters: &'a dyn CounterStore,
    succeeded_key: String,
    counter_ttl: Duration,
    owned: HashSet<i64>,
    succeeded: Vec<i64>,
    uncounted: bool,
}

impl<'a> ResultWriter<'a> {
    pub fn new(
        run_id: i64,
        repository: &'a dyn WorkItemRepository,
        counters: &'a dyn CounterStore,
        succeeded_key: String,
        counter_ttl: Duration,
        owned: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            run_id,
            repository,
            counters,
            succeeded_key,
            counter_ttl,
            owned: owned.into_iter().collect(),
            succeeded: Vec::new(),
            uncounted: false,
        }
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Persist one output. Outputs for lexemes outside the batch are ignored.
    pub async fn record(&mut self, output: ProcessOutput) -> Result<bool> {
        let lexeme_id = output.lexeme_id;
        if !self.owned.remove(&lexeme_id) {
            warn!(
                "Run {}: ignoring output for lexeme {} outside the batch",
                self.run_id, lexeme_id
            );
            return Ok(false);
        }

        self.repository.upsert_result(self.run_id, &output).await?;
        let moved = self
            .repository
            .transition_lexemes(&[lexeme_id], LexemeStatus::Processing, LexemeStatus::Succeeded)
            .await?;
        if moved.is_empty() {
            debug!("Run {}: lexeme {} no longer processing", self.run_id, lexeme_id);
            return Ok(false);
        }

        if let Err(e) = self
            .counters
            .increment(&self.succeeded_key, 1, self.counter_ttl)
            .await
        {
            // hand the lexeme back so a redelivery counts it
            if let Err(revert_err) = self
                .repository
                .transition_lexemes(&[lexeme_id], LexemeStatus::Succeeded, LexemeStatus::Processing)
                .await
            {
                error!(
                    "Run {}: could not return lexeme {} to processing: {}",
                    self.run_id, lexeme_id, revert_err
                );
            }
            self.owned.insert(lexeme_id);
            self.uncounted = true;
            return Err(e);
        }
        self.succeeded.push(lexeme_id);
        Ok(true)
    }

    /// True once a success could not be counted. The batch must then be
    /// redelivered rather than completed.
    pub fn has_uncounted(&self) -> bool {
        self.uncounted
    }

    /// Lexemes of the batch with no recorded output yet
    pub fn unwritten(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.owned.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn succeeded(&self) -> &[i64] {
        &self.succeeded
    }
}
