//! Dispatcher: claim pending lexemes, plan batches, enqueue workers

use super::core::Pipeline;
use super::keys::{Counter, RunKeys};
use crate::core::batch::{TokenCost, estimate_tokens, plan_batches};
use crate::core::models::LexemeStatus;
use crate::storage::queue::Task;
use crate::utils::error::Result;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// What a dispatch invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Run missing, terminal or already started
    Skipped,
    /// Processor could not be resolved; the run is failed
    ProcessorUnavailable,
    /// Nothing was pending; finalize was queued directly
    Empty,
    /// Batches were queued
    Dispatched { lexemes: usize, batches: usize },
}

/// A claimed lexeme reduced to what planning needs
#[derive(Debug, Clone, Copy)]
struct Claimed {
    id: i64,
    tokens: usize,
}

impl TokenCost for Claimed {
    fn estimated_tokens(&self) -> usize {
        self.tokens
    }
}

impl Pipeline {
    /// Dispatch a run.
    ///
    /// Redundant triggers are harmless: only a `pending` run is started, and
    /// the start is a conditional update that succeeds once. Errors after the
    /// start fail the run, release its claims and propagate.
    pub async fn dispatch(&self, run_id: i64) -> Result<DispatchOutcome> {
        let Some(run) = self.repository.get_run(run_id).await? else {
            info!("Run {}: not found, nothing to dispatch", run_id);
            return Ok(DispatchOutcome::Skipped);
        };
        if run.is_terminal() {
            info!("Run {}: already {}, not dispatching", run_id, run.status);
            return Ok(DispatchOutcome::Skipped);
        }

        if let Err(e) = self.processors.resolve(&run.processor) {
            error!("Run {}: cannot resolve processor {}: {}", run_id, run.processor, e);
            self.repository.fail_run(run_id, &e.to_string()).await?;
            return Ok(DispatchOutcome::ProcessorUnavailable);
        }

        if !self.repository.start_run(run_id).await? {
            info!("Run {}: already started, not dispatching", run_id);
            return Ok(DispatchOutcome::Skipped);
        }
        info!("Run {}: dispatching with processor {}", run_id, run.processor);

        let mut claimed = Vec::new();
        match self.claim_and_enqueue(run_id, &mut claimed).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Run {}: dispatch failed: {}", run_id, e);
                if let Err(fail_err) = self.repository.fail_run(run_id, &e.to_string()).await {
                    warn!("Run {}: could not mark failed: {}", run_id, fail_err);
                }
                self.release(run_id, &claimed).await;
                Err(e)
            }
        }
    }

    async fn claim_and_enqueue(
        &self,
        run_id: i64,
        claimed: &mut Vec<Claimed>,
    ) -> Result<DispatchOutcome> {
        self.claim_pending(run_id, claimed).await?;

        let keys = RunKeys::new(run_id);
        let ttl = self.settings.counter_ttl();
        let initial = [
            (Counter::Total, claimed.len() as i64),
            (Counter::Succeeded, 0),
            (Counter::Failed, 0),
            (Counter::BatchesTotal, 0),
            (Counter::BatchesDone, 0),
        ];
        for (counter, value) in initial {
            self.counters
                .write(&keys.counter(counter), value, ttl, true)
                .await?;
        }

        if claimed.is_empty() {
            info!("Run {}: no pending lexemes, finalizing", run_id);
            self.queue.enqueue(Task::Finalize { run_id }).await?;
            return Ok(DispatchOutcome::Empty);
        }

        let lexemes = claimed.len();
        let batches = plan_batches(claimed.clone(), self.settings.max_tokens_per_batch);
        self.counters
            .write(
                &keys.counter(Counter::BatchesTotal),
                batches.len() as i64,
                ttl,
                false,
            )
            .await?;

        let batch_count = batches.len();
        for (batch_index, batch) in batches.into_iter().enumerate() {
            debug!(
                "Run {}: batch {} has {} lexemes (~{} tokens)",
                run_id,
                batch_index,
                batch.len(),
                batch.estimated_tokens
            );
            self.queue
                .enqueue(Task::ProcessBatch {
                    run_id,
                    batch_index,
                    lexeme_ids: batch.items.iter().map(|item| item.id).collect(),
                })
                .await?;
        }

        info!(
            "Run {}: dispatched {} lexemes in {} batches",
            run_id, lexemes, batch_count
        );
        Ok(DispatchOutcome::Dispatched {
            lexemes,
            batches: batch_count,
        })
    }

    /// Page through pending lexemes by id, claiming each page with a
    /// conditional `pending -> processing` update. Rows another dispatcher
    /// got first are simply not returned by the update.
    async fn claim_pending(&self, run_id: i64, claimed: &mut Vec<Claimed>) -> Result<()> {
        let page_size = self.settings.page_size.max(1);
        let mut cursor = None;

        loop {
            let page = self
                .repository
                .scan_lexemes(LexemeStatus::Pending, cursor, page_size)
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(last.id);
            let exhausted = (page.len() as u64) < page_size;

            let ids: Vec<i64> = page.iter().map(|lexeme| lexeme.id).collect();
            let won: HashSet<i64> = self
                .repository
                .transition_lexemes(&ids, LexemeStatus::Pending, LexemeStatus::Processing)
                .await?
                .into_iter()
                .collect();
            debug!("Run {}: claimed {} of {} in page", run_id, won.len(), ids.len());

            claimed.extend(
                page.iter()
                    .filter(|lexeme| won.contains(&lexeme.id))
                    .map(|lexeme| Claimed {
                        id: lexeme.id,
                        tokens: estimate_tokens(lexeme.source_text.as_bytes()),
                    }),
            );

            if exhausted {
                break;
            }
        }
        Ok(())
    }

    /// Hand claimed lexemes back to `pending` after a failed dispatch
    async fn release(&self, run_id: i64, claimed: &[Claimed]) {
        if claimed.is_empty() {
            return;
        }
        let ids: Vec<i64> = claimed.iter().map(|item| item.id).collect();
        match self
            .repository
            .transition_lexemes(&ids, LexemeStatus::Processing, LexemeStatus::Pending)
            .await
        {
            Ok(released) => info!("Run {}: released {} claimed lexemes", run_id, released.len()),
            Err(e) => warn!("Run {}: could not release claims: {}", run_id, e),
        }
    }
}
