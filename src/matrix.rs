use itertools::Itertools;

use crate::errors::EvalError;
use crate::io::{ItemId, UserId};

/// Compressed sparse row matrix of user-item interaction counts.
///
/// Rows are users, columns are items. The arena layout (row offsets, column
/// indices, values) keeps row extraction an explicit slice operation.
/// Instances are immutable after construction.
pub struct CsrMatrix {
    num_rows: usize,
    num_cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<u32>,
    values: Vec<f32>,
}

impl CsrMatrix {
    /// Builds a matrix from `(user, item, value)` triplets in any order.
    /// Duplicate coordinates are summed. Out-of-range coordinates and
    /// negative values are rejected.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        triplets: &[(UserId, ItemId, f32)],
    ) -> Result<CsrMatrix, EvalError> {
        for &(row, col, value) in triplets {
            if row >= num_rows || col >= num_cols {
                return Err(EvalError::DataIntegrity(format!(
                    "interaction ({}, {}) outside matrix shape ({}, {})",
                    row, col, num_rows, num_cols
                )));
            }
            if value < 0.0 {
                return Err(EvalError::DataIntegrity(format!(
                    "negative interaction value {} at ({}, {})",
                    value, row, col
                )));
            }
        }

        let mut sorted = triplets.to_vec();
        sorted.sort_unstable_by(|(row_a, col_a, _), (row_b, col_b, _)| {
            (row_a, col_a).cmp(&(row_b, col_b))
        });

        let mut entries_per_row = vec![0_usize; num_rows];
        let mut col_indices = Vec::with_capacity(sorted.len());
        let mut values = Vec::with_capacity(sorted.len());
        for ((row, col), coordinate_group) in &sorted
            .iter()
            .group_by(|(row, col, _value)| (*row, *col))
        {
            let summed: f32 = coordinate_group.map(|(_, _, value)| *value).sum();
            entries_per_row[row] += 1;
            col_indices.push(col as u32);
            values.push(summed);
        }

        let mut row_offsets = Vec::with_capacity(num_rows + 1);
        row_offsets.push(0);
        for row in 0..num_rows {
            row_offsets.push(row_offsets[row] + entries_per_row[row]);
        }

        Ok(CsrMatrix {
            num_rows,
            num_cols,
            row_offsets,
            col_indices,
            values,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn nnz(&self) -> usize {
        self.col_indices.len()
    }

    /// Column indices and values of one row, sorted by column.
    pub fn row(&self, row: UserId) -> (&[u32], &[f32]) {
        let start = self.row_offsets[row];
        let end = self.row_offsets[row + 1];
        (&self.col_indices[start..end], &self.values[start..end])
    }

    /// One row expanded to a dense vector of length `num_cols`.
    pub fn to_dense_row(&self, row: UserId) -> Vec<f32> {
        let mut dense = vec![0.0_f32; self.num_cols];
        let (cols, vals) = self.row(row);
        for (&col, &value) in cols.iter().zip(vals.iter()) {
            dense[col as usize] = value;
        }
        dense
    }
}

#[cfg(test)]
mod csr_matrix_test {
    use super::*;

    #[test]
    fn should_build_from_unordered_triplets() {
        let triplets = vec![(1, 2, 1.0), (0, 3, 2.0), (1, 0, 1.0)];
        let matrix = CsrMatrix::from_triplets(3, 4, &triplets).unwrap();

        assert_eq!(3, matrix.num_rows());
        assert_eq!(4, matrix.num_cols());
        assert_eq!(3, matrix.nnz());

        let (cols, vals) = matrix.row(1);
        assert_eq!(&[0, 2], cols);
        assert_eq!(&[1.0, 1.0], vals);
        assert_eq!(vec![0.0, 0.0, 0.0, 2.0], matrix.to_dense_row(0));
        assert!(matrix.row(2).0.is_empty());
    }

    #[test]
    fn should_sum_duplicate_coordinates() {
        let triplets = vec![(0, 1, 1.0), (0, 1, 2.0)];
        let matrix = CsrMatrix::from_triplets(1, 2, &triplets).unwrap();

        assert_eq!(1, matrix.nnz());
        assert_eq!(vec![0.0, 3.0], matrix.to_dense_row(0));
    }

    #[test]
    fn should_reject_out_of_range_coordinates() {
        let result = CsrMatrix::from_triplets(2, 2, &[(2, 0, 1.0)]);
        assert!(matches!(result, Err(EvalError::DataIntegrity(_))));

        let result = CsrMatrix::from_triplets(2, 2, &[(0, 2, 1.0)]);
        assert!(matches!(result, Err(EvalError::DataIntegrity(_))));
    }

    #[test]
    fn should_reject_negative_values() {
        let result = CsrMatrix::from_triplets(1, 1, &[(0, 0, -1.0)]);
        assert!(matches!(result, Err(EvalError::DataIntegrity(_))));
    }
}
