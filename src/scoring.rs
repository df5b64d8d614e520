use hashbrown::HashMap;

use crate::batch::{HistoryEncoder, MASK_VALID};
use crate::errors::EvalError;
use crate::io::{ItemId, TokenId, UserId};
use crate::matrix::CsrMatrix;

/// The opaque scoring model boundary. Given a batch of token sequences and
/// their attention masks, returns one relevance score per item for every
/// sequence, aligned to the interaction matrices' item ids.
pub trait ItemScorer {
    fn score(
        &self,
        input_ids: &[Vec<TokenId>],
        attention_mask: &[Vec<u8>],
    ) -> Result<Vec<Vec<f32>>, EvalError>;
}

/// Returns a copy of `scores` where every item the user already interacted
/// with in the training split is forced to negative infinity, so it sorts
/// after every unseen item. The input is left untouched.
pub fn mask_seen(scores: &[f32], train_row: &[f32]) -> Vec<f32> {
    debug_assert_eq!(scores.len(), train_row.len());
    scores
        .iter()
        .zip(train_row.iter())
        .map(|(&score, &seen)| if seen > 0.0 { f32::NEG_INFINITY } else { score })
        .collect()
}

/// Encoder mirroring the recommendation tokenizer's vocabulary layout: the
/// user token is the user id itself and item tokens follow the user block,
/// so item `j` becomes token `num_users + j`. A user's sequence is their
/// user token followed by their training items in ascending item order.
pub struct TrainHistoryEncoder<'a> {
    train: &'a CsrMatrix,
}

impl<'a> TrainHistoryEncoder<'a> {
    pub fn new(train: &'a CsrMatrix) -> TrainHistoryEncoder<'a> {
        TrainHistoryEncoder { train }
    }
}

impl<'a> HistoryEncoder for TrainHistoryEncoder<'a> {
    fn encode(&self, user: UserId) -> (Vec<TokenId>, Vec<u8>) {
        let item_token_base = self.train.num_rows() as TokenId;
        let (item_ids, _counts) = self.train.row(user);
        let mut input_ids = Vec::with_capacity(item_ids.len() + 1);
        input_ids.push(user as TokenId);
        input_ids.extend(item_ids.iter().map(|&item| item_token_base + item));
        let mask = vec![MASK_VALID; input_ids.len()];
        (input_ids, mask)
    }
}

/// Scorer backed by a precomputed score table, for offline evaluation of
/// model output that was staged to disk. Rows are keyed by the leading user
/// token of each sequence; users without a staged row score zero everywhere.
pub struct PrecomputedScorer {
    rows: HashMap<TokenId, Vec<f32>>,
    num_items: usize,
}

impl PrecomputedScorer {
    pub fn from_triplets(
        num_users: usize,
        num_items: usize,
        triplets: &[(UserId, ItemId, f32)],
    ) -> Result<PrecomputedScorer, EvalError> {
        let mut rows: HashMap<TokenId, Vec<f32>> = HashMap::new();
        for &(user, item, score) in triplets {
            if user >= num_users || item >= num_items {
                return Err(EvalError::DataIntegrity(format!(
                    "score entry ({}, {}) outside shape ({}, {})",
                    user, item, num_users, num_items
                )));
            }
            let row = rows
                .entry(user as TokenId)
                .or_insert_with(|| vec![0.0_f32; num_items]);
            row[item] = score;
        }
        Ok(PrecomputedScorer { rows, num_items })
    }
}

impl ItemScorer for PrecomputedScorer {
    fn score(
        &self,
        input_ids: &[Vec<TokenId>],
        _attention_mask: &[Vec<u8>],
    ) -> Result<Vec<Vec<f32>>, EvalError> {
        input_ids
            .iter()
            .map(|sequence| {
                let user_token = sequence.first().ok_or_else(|| {
                    EvalError::Scoring("empty token sequence in batch".to_string())
                })?;
                Ok(self
                    .rows
                    .get(user_token)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0_f32; self.num_items]))
            })
            .collect()
    }
}
