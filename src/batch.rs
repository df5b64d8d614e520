use crate::errors::EvalError;
use crate::io::{TokenId, UserId};
use crate::matrix::CsrMatrix;

/// Padding token and attention mask values, matching the model's convention.
pub const PAD_TOKEN: TokenId = 0;
pub const MASK_VALID: u8 = 1;
pub const MASK_PADDING: u8 = 0;

/// Maps a user id to the token sequence the scoring model consumes, plus the
/// attention mask over that sequence. Implemented by the external tokenizer.
pub trait HistoryEncoder {
    fn encode(&self, user: UserId) -> (Vec<TokenId>, Vec<u8>);
}

/// One model-ready batch. All four fields are positionally aligned with the
/// user slice the batch was built from.
pub struct EvalBatch {
    pub input_ids: Vec<Vec<TokenId>>,
    pub attention_mask: Vec<Vec<u8>>,
    pub train_rows: Vec<Vec<f32>>,
    pub test_rows: Vec<Vec<f32>>,
}

impl EvalBatch {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Turns user-id slices into [`EvalBatch`]es. Pure: every call allocates
/// fresh output, the matrices are only read.
pub struct EvaluationBatchBuilder<'a, E: HistoryEncoder> {
    encoder: &'a E,
    train: &'a CsrMatrix,
    test: &'a CsrMatrix,
}

impl<'a, E: HistoryEncoder> EvaluationBatchBuilder<'a, E> {
    pub fn new(
        encoder: &'a E,
        train: &'a CsrMatrix,
        test: &'a CsrMatrix,
    ) -> Result<EvaluationBatchBuilder<'a, E>, EvalError> {
        if train.num_rows() != test.num_rows() || train.num_cols() != test.num_cols() {
            return Err(EvalError::DataIntegrity(format!(
                "train matrix shape ({}, {}) does not match test matrix shape ({}, {})",
                train.num_rows(),
                train.num_cols(),
                test.num_rows(),
                test.num_cols()
            )));
        }
        Ok(EvaluationBatchBuilder {
            encoder,
            train,
            test,
        })
    }

    pub fn num_users(&self) -> usize {
        self.train.num_rows()
    }

    pub fn num_items(&self) -> usize {
        self.train.num_cols()
    }

    /// Builds the token sequences, attention masks and dense train/test rows
    /// for `users`. Sequences are right-padded to the longest in the batch.
    pub fn build(&self, users: &[UserId]) -> Result<EvalBatch, EvalError> {
        for &user in users {
            if user >= self.num_users() {
                return Err(EvalError::DataIntegrity(format!(
                    "user id {} out of range for {} users",
                    user,
                    self.num_users()
                )));
            }
        }

        let encoded: Vec<(Vec<TokenId>, Vec<u8>)> = users
            .iter()
            .map(|&user| self.encoder.encode(user))
            .collect();
        let max_len = encoded
            .iter()
            .map(|(tokens, _)| tokens.len())
            .max()
            .unwrap_or(0);

        let mut input_ids = Vec::with_capacity(users.len());
        let mut attention_mask = Vec::with_capacity(users.len());
        for (mut tokens, mut mask) in encoded {
            tokens.resize(max_len, PAD_TOKEN);
            mask.resize(max_len, MASK_PADDING);
            input_ids.push(tokens);
            attention_mask.push(mask);
        }

        let train_rows = users
            .iter()
            .map(|&user| self.train.to_dense_row(user))
            .collect();
        let test_rows = users
            .iter()
            .map(|&user| self.test.to_dense_row(user))
            .collect();

        Ok(EvalBatch {
            input_ids,
            attention_mask,
            train_rows,
            test_rows,
        })
    }
}

#[cfg(test)]
mod batch_builder_test {
    use super::*;

    struct StubEncoder;

    impl HistoryEncoder for StubEncoder {
        fn encode(&self, user: UserId) -> (Vec<TokenId>, Vec<u8>) {
            // variable-length sequences to exercise padding
            let tokens: Vec<TokenId> = (0..=user as TokenId).map(|t| t + 1).collect();
            let mask = vec![MASK_VALID; tokens.len()];
            (tokens, mask)
        }
    }

    fn matrices() -> (CsrMatrix, CsrMatrix) {
        let train = CsrMatrix::from_triplets(3, 4, &[(0, 1, 1.0), (2, 3, 2.0)]).unwrap();
        let test = CsrMatrix::from_triplets(3, 4, &[(0, 2, 1.0)]).unwrap();
        (train, test)
    }

    #[test]
    fn should_align_outputs_with_user_order() {
        let (train, test) = matrices();
        let builder = EvaluationBatchBuilder::new(&StubEncoder, &train, &test).unwrap();

        let batch = builder.build(&[2, 0]).unwrap();
        assert_eq!(2, batch.len());
        assert_eq!(vec![0.0, 0.0, 0.0, 2.0], batch.train_rows[0]);
        assert_eq!(vec![0.0, 1.0, 0.0, 0.0], batch.train_rows[1]);
        assert_eq!(vec![0.0, 0.0, 0.0, 0.0], batch.test_rows[0]);
        assert_eq!(vec![0.0, 0.0, 1.0, 0.0], batch.test_rows[1]);
    }

    #[test]
    fn should_pad_sequences_to_batch_max() {
        let (train, test) = matrices();
        let builder = EvaluationBatchBuilder::new(&StubEncoder, &train, &test).unwrap();

        let batch = builder.build(&[0, 2]).unwrap();
        assert_eq!(vec![1, PAD_TOKEN, PAD_TOKEN], batch.input_ids[0]);
        assert_eq!(vec![1, 2, 3], batch.input_ids[1]);
        assert_eq!(vec![MASK_VALID, MASK_PADDING, MASK_PADDING], batch.attention_mask[0]);
        assert_eq!(vec![MASK_VALID; 3], batch.attention_mask[1]);
    }

    #[test]
    fn should_reject_out_of_range_users() {
        let (train, test) = matrices();
        let builder = EvaluationBatchBuilder::new(&StubEncoder, &train, &test).unwrap();

        let result = builder.build(&[3]);
        assert!(matches!(result, Err(EvalError::DataIntegrity(_))));
    }

    #[test]
    fn should_reject_mismatched_matrix_shapes() {
        let train = CsrMatrix::from_triplets(3, 4, &[]).unwrap();
        let test = CsrMatrix::from_triplets(3, 5, &[]).unwrap();

        let result = EvaluationBatchBuilder::new(&StubEncoder, &train, &test);
        assert!(matches!(result, Err(EvalError::DataIntegrity(_))));
    }
}
