//! Exact brute-force similarity index over the embeddings table.
//!
//! Streams every stored row and ranks it against the source vector, so each
//! query costs O(items x dimension). Rows written concurrently may or may not
//! be observed by an in-progress scan.

use futures_util::TryStreamExt;
use seedrank_core::embedding::index::{ExactRanker, SimilarityIndex};
use seedrank_types::embedding::{ItemEmbedding, Score};
use seedrank_types::error::EmbeddingError;
use sqlx::Row;

use super::embedding::{decode_vector, store_err};
use super::pool::DatabasePool;

/// Full-table-scan implementation of `SimilarityIndex`.
pub struct SqliteScanIndex {
    pool: DatabasePool,
}

impl SqliteScanIndex {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SimilarityIndex for SqliteScanIndex {
    async fn nearest(
        &self,
        source: &ItemEmbedding,
        n: usize,
    ) -> Result<Vec<Score>, EmbeddingError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut ranker = ExactRanker::new(source, n);
        let mut rows =
            sqlx::query("SELECT item_id, vector FROM item_embeddings").fetch(&self.pool.reader);

        while let Some(row) = rows.try_next().await.map_err(store_err)? {
            let item_id: String = row.try_get("item_id").map_err(store_err)?;
            if item_id == source.item_id {
                continue;
            }
            let raw: String = row.try_get("vector").map_err(store_err)?;
            let vector = decode_vector(&item_id, &raw)?;
            ranker.offer(item_id, &vector);
        }

        if ranker.skipped() > 0 {
            tracing::warn!(
                item_id = %source.item_id,
                skipped = ranker.skipped(),
                "similarity scan skipped embeddings with a different dimension"
            );
        }

        Ok(ranker.finish())
    }
}
