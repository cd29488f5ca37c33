//! Bounded top-K selection.
//!
//! [`TopKFilter`] keeps only the `k` highest-weighted entries pushed into it,
//! using a min-heap so the weakest retained entry is evicted in O(log k).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Upper bound on the heap's up-front allocation; larger `k` grow on demand.
const PREALLOC_LIMIT: usize = 1024;

/// An entry ranked by weight; among equal weights the smaller item ranks higher.
#[derive(Debug)]
struct Ranked<T> {
    item: T,
    weight: f64,
}

impl<T: Ord> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| other.item.cmp(&self.item))
    }
}

impl<T: Ord> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for Ranked<T> {}

/// Fixed-capacity filter retaining the `k` best (item, weight) pairs seen.
#[derive(Debug)]
pub struct TopKFilter<T> {
    k: usize,
    // Reverse turns the max-heap into a min-heap: the top is the weakest entry.
    heap: BinaryHeap<Reverse<Ranked<T>>>,
}

impl<T: Ord> TopKFilter<T> {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.min(PREALLOC_LIMIT)),
        }
    }

    /// Offer an entry. When full, it replaces the weakest entry only if it
    /// ranks strictly higher.
    pub fn push(&mut self, item: T, weight: f64) {
        if self.k == 0 {
            return;
        }
        let candidate = Ranked { item, weight };
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
            return;
        }
        if let Some(mut weakest) = self.heap.peek_mut() {
            if candidate > weakest.0 {
                *weakest = Reverse(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain the filter, returning entries ordered best first.
    pub fn into_sorted(self) -> Vec<(T, f64)> {
        // Ascending order of Reverse<_> is descending order of the ranking.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| (ranked.item, ranked.weight))
            .collect()
    }

    /// Drain the filter, returning only the items ordered best first.
    pub fn into_sorted_items(self) -> Vec<T> {
        self.into_sorted().into_iter().map(|(item, _)| item).collect()
    }
}
