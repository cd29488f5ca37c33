//! Vector similarity primitives.

use std::cmp::Ordering;

use seedrank_types::embedding::Score;

/// Cosine similarity between two vectors.
///
/// Returns `0.0` when either vector has zero norm. Both slices are expected to
/// have the same length; callers that cannot guarantee this should check
/// first (see [`same_dimension`]).
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub fn same_dimension(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
}

/// Ranking order for scores: descending by score, ties broken by ascending id.
pub fn compare_scores(a: &Score, b: &Score) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort scores in ranking order (see [`compare_scores`]).
pub fn sort_scores(scores: &mut [Score]) {
    scores.sort_by(compare_scores);
}
