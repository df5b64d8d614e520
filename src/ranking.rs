use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::io::ItemId;

/// A scored item. The ordering is reversed so that a `BinaryHeap` pops the
/// worst candidate first and `into_sorted_vec` yields the best first:
/// higher score wins, score ties go to the lower item id.
#[derive(PartialEq, Debug)]
pub struct ItemScore {
    pub id: ItemId,
    pub score: f32,
}

impl ItemScore {
    fn new(id: ItemId, score: f32) -> Self {
        ItemScore { id, score }
    }
}

impl Eq for ItemScore {}

impl Ord for ItemScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.score.partial_cmp(&self.score) {
            Some(Ordering::Less) => Ordering::Less,
            Some(Ordering::Greater) => Ordering::Greater,
            _ => self.id.cmp(&other.id),
        }
    }
}

impl PartialOrd for ItemScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the ids of the `k` highest scoring items, best first.
/// Deterministic: ties are broken by ascending item id.
pub fn top_k(scores: &[f32], k: usize) -> Vec<ItemId> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<ItemScore> = BinaryHeap::with_capacity(k + 1);
    for (id, &score) in scores.iter().enumerate() {
        let candidate = ItemScore::new(id, score);
        if heap.len() < k {
            heap.push(candidate);
        } else if candidate < *heap.peek().unwrap() {
            heap.pop();
            heap.push(candidate);
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|scored| scored.id)
        .collect()
}

#[cfg(test)]
mod top_k_test {
    use super::*;

    #[test]
    fn should_rank_by_descending_score() {
        let scores = vec![0.1, 0.9, 0.5, 0.7];
        assert_eq!(vec![1, 3, 2, 0], top_k(&scores, 4));
        assert_eq!(vec![1, 3], top_k(&scores, 2));
    }

    #[test]
    fn should_break_ties_by_ascending_item_id() {
        let scores = vec![0.5, 0.9, 0.5, 0.5];
        assert_eq!(vec![1, 0, 2], top_k(&scores, 3));
    }

    #[test]
    fn should_sort_masked_items_last() {
        let scores = vec![f32::NEG_INFINITY, 0.2, f32::NEG_INFINITY, 0.1];
        assert_eq!(vec![1, 3], top_k(&scores, 2));
        // k beyond the unmasked items lets masked items enter the tail
        assert_eq!(vec![1, 3, 0], top_k(&scores, 3));
    }

    #[test]
    fn should_handle_k_larger_than_item_count() {
        let scores = vec![0.2, 0.4];
        assert_eq!(vec![1, 0], top_k(&scores, 10));
        assert!(top_k(&scores, 0).is_empty());
    }
}
