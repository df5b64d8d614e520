use std::cmp;

use crate::metrics::RankingMetric;
use crate::ranking;

/// NDCG@K for one user with binary relevance: DCG over the top-k ranked
/// list with a `1/log2(rank + 1)` discount (ranks are 1-based), normalized
/// by the DCG of the ideal ordering over `min(k, #positives)` positions.
/// Zero positives means an IDCG of zero; the user scores zero, never NaN.
pub fn ndcg_at_k(target_row: &[f32], score_row: &[f32], k: usize) -> f64 {
    let positives = target_row.iter().filter(|&&value| value > 0.0).count();
    if positives == 0 || k == 0 {
        return 0.0;
    }

    let mut dcg = 0.0_f64;
    for (position, &item) in ranking::top_k(score_row, k).iter().enumerate() {
        if target_row[item] > 0.0 {
            dcg += discount(position);
        }
    }

    let idcg: f64 = (0..cmp::min(k, positives)).map(discount).sum();
    dcg / idcg
}

// rank = position + 1, so the discount is 1/log2(position + 2)
fn discount(position: usize) -> f64 {
    1.0 / (position as f64 + 2.0).log2()
}

pub struct Ndcg {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
}

impl Ndcg {
    pub fn new(length: usize) -> Ndcg {
        Ndcg {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
        }
    }
}

impl RankingMetric for Ndcg {
    fn add(&mut self, target_row: &[f32], score_row: &[f32]) {
        self.qty += 1;
        self.sum_of_scores += ndcg_at_k(target_row, score_row, self.length);
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("NDCG@{}", self.length)
    }
}
