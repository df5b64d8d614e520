pub mod evaluation_reporter;
pub mod ndcg;
pub mod recall;

/// A top-K ranking metric accumulated over users.
///
/// `add` scores one user's (masked) score row against their held-out row and
/// adds the per-user value to a running sum; `result` divides by the number
/// of users seen, once, at the end. Summation is order-insensitive, so any
/// batch partition of the user population yields the same aggregate.
pub trait RankingMetric {
    fn add(&mut self, target_row: &[f32], score_row: &[f32]);
    fn result(&self) -> f64;
    fn get_name(&self) -> String;
}
