//! Batch worker

use super::core::Pipeline;
use super::keys::{Counter, RunKeys};
use crate::core::models::{Lexeme, LexemeStatus, ProcessRun};
use crate::core::processor::{Processor, ResultWriter};
use crate::storage::queue::Task;
use crate::utils::error::Result;
use tracing::{debug, error, info, warn};

/// What a batch worker invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Run missing or already terminal
    Skipped,
    Completed { succeeded: usize, failed: usize },
}

impl Pipeline {
    /// Process one batch of a run.
    ///
    /// Processor and per-item failures are contained here: they mark the
    /// affected lexemes failed and never fail the task. A failure to count an
    /// item does fail the task, with the item back in `processing`, so a
    /// redelivery processes and counts it again.
    pub async fn process_batch(
        &self,
        run_id: i64,
        batch_index: usize,
        lexeme_ids: &[i64],
    ) -> Result<BatchOutcome> {
        let Some(run) = self.repository.get_run(run_id).await? else {
            debug!("Run {}: gone, skipping batch {}", run_id, batch_index);
            return Ok(BatchOutcome::Skipped);
        };
        if run.is_terminal() {
            debug!("Run {}: already {}, skipping batch {}", run_id, run.status, batch_index);
            return Ok(BatchOutcome::Skipped);
        }

        let (succeeded, failed) = self.execute_batch(&run, batch_index, lexeme_ids).await?;
        info!(
            "Run {}: batch {} finished, {} succeeded, {} failed",
            run_id, batch_index, succeeded, failed
        );

        self.complete_batch(run_id, batch_index).await?;
        self.broadcast_progress(run_id).await;
        Ok(BatchOutcome::Completed { succeeded, failed })
    }

    async fn execute_batch(
        &self,
        run: &ProcessRun,
        batch_index: usize,
        lexeme_ids: &[i64],
    ) -> Result<(usize, usize)> {
        let run_id = run.id;

        let processor = match self.processors.resolve(&run.processor) {
            Ok(processor) => processor,
            Err(e) => {
                error!("Run {}: batch {}: {}", run_id, batch_index, e);
                return Ok((0, self.fail_lexemes(run_id, lexeme_ids).await?));
            }
        };

        // ids from the queue may be stale; only lexemes still processing count
        let lexemes: Vec<Lexeme> = self
            .repository
            .load_lexemes(lexeme_ids)
            .await?
            .into_iter()
            .filter(|lexeme| lexeme.status == LexemeStatus::Processing)
            .collect();
        if lexemes.is_empty() {
            debug!("Run {}: batch {} has nothing left to process", run_id, batch_index);
            return Ok((0, 0));
        }

        let keys = RunKeys::new(run_id);
        let mut writer = ResultWriter::new(
            run_id,
            self.repository.as_ref(),
            self.counters.as_ref(),
            keys.counter(Counter::Succeeded),
            self.settings.counter_ttl(),
            lexemes.iter().map(|lexeme| lexeme.id),
        );

        match Self::run_processor(processor.as_ref(), &lexemes, &mut writer).await {
            Ok(()) => {
                if !writer.unwritten().is_empty() {
                    warn!(
                        "Run {}: batch {}: no output for {} lexemes",
                        run_id,
                        batch_index,
                        writer.unwritten().len()
                    );
                }
            }
            Err(e) if writer.has_uncounted() => {
                error!("Run {}: batch {}: counting results: {}", run_id, batch_index, e);
                return Err(e);
            }
            Err(e) => error!("Run {}: batch {} failed: {}", run_id, batch_index, e),
        }

        let succeeded = writer.succeeded().len();
        let leftover = writer.unwritten();
        drop(writer);
        Ok((succeeded, self.fail_lexemes(run_id, &leftover).await?))
    }

    async fn run_processor(
        processor: &dyn Processor,
        lexemes: &[Lexeme],
        writer: &mut ResultWriter<'_>,
    ) -> Result<()> {
        let input = processor.build_input(lexemes)?;
        let outputs = processor.run(input).await?;
        processor.write_results(outputs, writer).await
    }

    /// Move the still-processing lexemes among `ids` to failed and bump the
    /// failed counter by however many moved. If the bump fails they go back
    /// to processing and the error propagates.
    async fn fail_lexemes(&self, run_id: i64, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let moved = self
            .repository
            .transition_lexemes(ids, LexemeStatus::Processing, LexemeStatus::Failed)
            .await?;
        if moved.is_empty() {
            return Ok(0);
        }

        let key = RunKeys::new(run_id).counter(Counter::Failed);
        if let Err(e) = self
            .counters
            .increment(&key, moved.len() as i64, self.settings.counter_ttl())
            .await
        {
            error!("Run {}: could not count {} failures: {}", run_id, moved.len(), e);
            if let Err(revert_err) = self
                .repository
                .transition_lexemes(&moved, LexemeStatus::Failed, LexemeStatus::Processing)
                .await
            {
                error!("Run {}: could not return lexemes to processing: {}", run_id, revert_err);
            }
            return Err(e);
        }
        Ok(moved.len())
    }

    /// Count the batch done once and trigger finalize when every batch has
    /// reported. Redelivered batches re-check the trigger without counting.
    async fn complete_batch(&self, run_id: i64, batch_index: usize) -> Result<()> {
        let keys = RunKeys::new(run_id);
        let ttl = self.settings.counter_ttl();
        let marker = keys.batch_done(batch_index);
        let batches_done_key = keys.counter(Counter::BatchesDone);

        let batches_done = if self.counters.write(&marker, 1, ttl, true).await? {
            match self.counters.increment(&batches_done_key, 1, ttl).await {
                Ok(done) => done,
                Err(e) => {
                    // let a retry count it
                    if let Err(delete_err) = self.counters.delete(&marker).await {
                        warn!("Run {}: could not clear {}: {}", run_id, marker, delete_err);
                    }
                    return Err(e);
                }
            }
        } else {
            debug!("Run {}: batch {} was already counted", run_id, batch_index);
            self.counters.read(&batches_done_key).await?.unwrap_or(0)
        };

        let batches_total = self
            .counters
            .read(&keys.counter(Counter::BatchesTotal))
            .await?
            .unwrap_or(0);
        debug!("Run {}: {}/{} batches done", run_id, batches_done, batches_total);

        if batches_total > 0 && batches_done >= batches_total {
            info!("Run {}: all batches reported, queueing finalize", run_id);
            self.queue.enqueue(Task::Finalize { run_id }).await?;
        }
        Ok(())
    }
}
