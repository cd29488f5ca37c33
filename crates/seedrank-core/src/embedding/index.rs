//! Similarity index trait.
//!
//! The embedding store delegates nearest-neighbor retrieval to a
//! `SimilarityIndex`. The default implementation in seedrank-infra is an
//! exact brute-force scan; an approximate index can be swapped in without
//! changing the `EmbeddingStore` contract.

use seedrank_types::embedding::{ItemEmbedding, Score};
use seedrank_types::error::EmbeddingError;

use crate::similarity::{cosine_similarity, same_dimension};
use crate::topk::TopKFilter;

/// Nearest-neighbor retrieval over stored embeddings.
pub trait SimilarityIndex: Send + Sync {
    /// Return up to `n` items most similar to `source`, best first.
    ///
    /// `source` itself must never appear in the result.
    fn nearest(
        &self,
        source: &ItemEmbedding,
        n: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Score>, EmbeddingError>> + Send;
}

/// Accumulates cosine scores for candidates against one source vector and
/// keeps the best `n`.
///
/// Shared by exact-scan index implementations so they only need to feed rows.
pub struct ExactRanker<'a> {
    source: &'a ItemEmbedding,
    filter: TopKFilter<String>,
    skipped: usize,
}

impl<'a> ExactRanker<'a> {
    pub fn new(source: &'a ItemEmbedding, n: usize) -> Self {
        Self {
            source,
            filter: TopKFilter::new(n),
            skipped: 0,
        }
    }

    /// Score one candidate. The source item and vectors of a different
    /// dimension are skipped.
    pub fn offer(&mut self, item_id: String, vector: &[f64]) {
        if item_id == self.source.item_id {
            return;
        }
        if !same_dimension(&self.source.vector, vector) {
            tracing::debug!(
                source_id = %self.source.item_id,
                item_id = %item_id,
                expected = self.source.vector.len(),
                actual = vector.len(),
                "skipping embedding with mismatched dimension"
            );
            self.skipped += 1;
            return;
        }
        let score = cosine_similarity(&self.source.vector, vector);
        self.filter.push(item_id, score);
    }

    /// Number of candidates skipped because of a dimension mismatch.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> Vec<Score> {
        self.filter
            .into_sorted()
            .into_iter()
            .map(|(id, score)| Score { id, score })
            .collect()
    }
}
