use crate::metrics::RankingMetric;
use crate::ranking;

/// Recall@K for one user: the fraction of their held-out items that appear
/// in the top-k ranked list. A user without any held-out item scores zero;
/// the caller still counts them toward the aggregate denominator.
pub fn recall_at_k(target_row: &[f32], score_row: &[f32], k: usize) -> f64 {
    let positives = target_row.iter().filter(|&&value| value > 0.0).count();
    if positives == 0 || k == 0 {
        return 0.0;
    }
    let hits = ranking::top_k(score_row, k)
        .iter()
        .filter(|&&item| target_row[item] > 0.0)
        .count();
    hits as f64 / positives as f64
}

pub struct Recall {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl Recall {
    /// Returns a Recall@K accumulator.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'k' that will be used for evaluation.
    ///
    pub fn new(length: usize) -> Recall {
        Recall {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }
}

impl RankingMetric for Recall {
    fn add(&mut self, target_row: &[f32], score_row: &[f32]) {
        self.qty += 1;
        self.sum_of_scores += recall_at_k(target_row, score_row, self.length);
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Recall@{}", self.length)
    }
}

#[cfg(test)]
mod recall_test {
    use super::*;

    #[test]
    fn should_calculate_recall() {
        // items 1 and 3 are relevant, top-2 by score is item0, item1
        let target_row = vec![0.0, 1.0, 0.0, 1.0];
        let score_row = vec![0.9, 0.8, 0.1, 0.7];

        assert!((0.5 - recall_at_k(&target_row, &score_row, 2)).abs() < f64::EPSILON);
    }

    #[test]
    fn should_be_non_decreasing_in_k() {
        let target_row = vec![0.0, 1.0, 0.0, 1.0, 1.0];
        let score_row = vec![0.9, 0.8, 0.6, 0.7, 0.1];

        let mut previous = 0.0;
        for k in 1..=5 {
            let current = recall_at_k(&target_row, &score_row, k);
            assert!(current >= previous);
            previous = current;
        }
        assert!((1.0 - previous).abs() < f64::EPSILON);
    }

    #[test]
    fn should_score_zero_for_empty_target_but_count_the_user() {
        let mut under_test = Recall::new(2);
        under_test.add(&[0.0, 0.0], &[0.5, 0.1]);
        under_test.add(&[1.0, 0.0], &[0.5, 0.1]);

        // the empty-target user halves the average instead of being skipped
        assert!((0.5 - under_test.result()).abs() < f64::EPSILON);
        assert_eq!("Recall@2", under_test.get_name());
    }

    #[test]
    fn should_handle_divide_by_zero() {
        let under_test = Recall::new(2);
        assert!((0.0 - under_test.result()).abs() < f64::EPSILON);
    }
}
