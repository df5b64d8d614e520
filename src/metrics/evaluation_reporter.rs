use crate::metrics::ndcg::Ndcg;
use crate::metrics::recall::Recall;
use crate::metrics::RankingMetric;

/// Accumulates every configured metric over the evaluated users and renders
/// the final report lines.
pub struct EvaluationReporter {
    metrics: Vec<Box<dyn RankingMetric>>,
}

impl EvaluationReporter {
    pub fn new(recall_cutoffs: &[usize], ndcg_cutoffs: &[usize]) -> EvaluationReporter {
        let mut metrics: Vec<Box<dyn RankingMetric>> = Vec::new();
        for &k in recall_cutoffs {
            metrics.push(Box::new(Recall::new(k)));
        }
        for &k in ndcg_cutoffs {
            metrics.push(Box::new(Ndcg::new(k)));
        }
        EvaluationReporter { metrics }
    }

    pub fn add(&mut self, target_row: &[f32], score_row: &[f32]) {
        for metric in self.metrics.iter_mut() {
            metric.add(target_row, score_row);
        }
    }

    /// Metric names and their final averaged values, in report order.
    pub fn results(&self) -> Vec<(String, f64)> {
        self.metrics
            .iter()
            .map(|metric| (metric.get_name(), metric.result()))
            .collect()
    }

    pub fn result(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| format!("{:.4}", metric.result()))
            .collect::<Vec<String>>()
            .join(",")
    }

    pub fn get_name(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| metric.get_name())
            .collect::<Vec<String>>()
            .join(",")
    }
}
