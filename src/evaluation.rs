use log::debug;

use crate::batch::{EvaluationBatchBuilder, HistoryEncoder};
use crate::errors::EvalError;
use crate::io::UserId;
use crate::metrics::evaluation_reporter::EvaluationReporter;
use crate::scoring::{mask_seen, ItemScorer};

/// Sequences the evaluation pass: batch building, scoring, masking and
/// metric accumulation. Batches never partially accumulate; the whole batch
/// is validated before the first user of it is counted, so a failure leaves
/// the accumulated state as if the batch had never been seen.
pub struct EvaluationDriver<'a, E: HistoryEncoder, S: ItemScorer> {
    builder: EvaluationBatchBuilder<'a, E>,
    scorer: &'a S,
    reporter: EvaluationReporter,
    users_evaluated: usize,
}

impl<'a, E: HistoryEncoder, S: ItemScorer> EvaluationDriver<'a, E, S> {
    pub fn new(
        builder: EvaluationBatchBuilder<'a, E>,
        scorer: &'a S,
        reporter: EvaluationReporter,
    ) -> EvaluationDriver<'a, E, S> {
        EvaluationDriver {
            builder,
            scorer,
            reporter,
            users_evaluated: 0,
        }
    }

    pub fn num_users(&self) -> usize {
        self.builder.num_users()
    }

    pub fn users_evaluated(&self) -> usize {
        self.users_evaluated
    }

    pub fn reporter(&self) -> &EvaluationReporter {
        &self.reporter
    }

    /// Evaluates every user in ascending id order with fixed-size batches.
    pub fn run(&mut self, batch_size: usize) -> Result<(), EvalError> {
        let users: Vec<UserId> = (0..self.num_users()).collect();
        for batch_users in users.chunks(batch_size.max(1)) {
            self.process_batch(batch_users)?;
        }
        Ok(())
    }

    /// Evaluates one batch of users and accumulates their metrics.
    pub fn process_batch(&mut self, users: &[UserId]) -> Result<(), EvalError> {
        if users.is_empty() {
            return Ok(());
        }
        let num_items = self.builder.num_items();
        let batch = self.builder.build(users)?;
        let score_rows = self.scorer.score(&batch.input_ids, &batch.attention_mask)?;

        if score_rows.len() != users.len() {
            return Err(EvalError::Scoring(format!(
                "scorer returned {} rows for a batch of {} users",
                score_rows.len(),
                users.len()
            )));
        }
        for (&user, score_row) in users.iter().zip(score_rows.iter()) {
            if score_row.len() != num_items {
                return Err(EvalError::Scoring(format!(
                    "score row for user {} has length {}, expected {}",
                    user,
                    score_row.len(),
                    num_items
                )));
            }
            if score_row.iter().any(|score| score.is_nan()) {
                return Err(EvalError::Scoring(format!(
                    "NaN score for user {}",
                    user
                )));
            }
        }

        for (index, &user) in users.iter().enumerate() {
            let test_row = &batch.test_rows[index];
            if test_row.iter().all(|&value| value <= 0.0) {
                // counts as zero towards every metric, stays in the denominator
                debug!("user {} has no held-out interactions", user);
            }
            let masked_scores = mask_seen(&score_rows[index], &batch.train_rows[index]);
            self.reporter.add(test_row, &masked_scores);
            self.users_evaluated += 1;
        }
        Ok(())
    }
}
