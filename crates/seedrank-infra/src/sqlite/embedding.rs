//! SQLite embedding store implementation.
//!
//! Implements `EmbeddingStore` from `seedrank-core` using sqlx with split
//! read/write pools. Vectors are stored as JSON arrays and timestamps as
//! RFC 3339 text. Similarity queries are delegated to a `SimilarityIndex`,
//! by default the exact [`SqliteScanIndex`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use seedrank_core::embedding::index::SimilarityIndex;
use seedrank_core::embedding::store::EmbeddingStore;
use seedrank_types::embedding::{ItemEmbedding, Score};
use seedrank_types::error::EmbeddingError;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::pool::DatabasePool;
use super::scan_index::SqliteScanIndex;

/// Upsert statement shared by single and batch writes. Keeping one SQL text
/// lets sqlx reuse the connection's cached prepared statement.
const UPSERT_SQL: &str = r#"INSERT INTO item_embeddings (item_id, vector, timestamp)
    VALUES (?, ?, ?)
    ON CONFLICT (item_id) DO UPDATE SET vector = excluded.vector, timestamp = excluded.timestamp"#;

/// Maximum bound parameters per `IN (...)` lookup.
const BATCH_GET_CHUNK: usize = 500;

/// SQLite-backed implementation of `EmbeddingStore`.
pub struct SqliteEmbeddingStore<I = SqliteScanIndex> {
    pool: DatabasePool,
    index: I,
    dimension: Option<usize>,
}

impl SqliteEmbeddingStore<SqliteScanIndex> {
    /// Create a store that answers similarity queries with a full scan.
    pub fn new(pool: DatabasePool) -> Self {
        let index = SqliteScanIndex::new(pool.clone());
        Self::with_index(pool, index)
    }
}

impl<I: SimilarityIndex> SqliteEmbeddingStore<I> {
    /// Create a store backed by a custom similarity index.
    pub fn with_index(pool: DatabasePool, index: I) -> Self {
        Self {
            pool,
            index,
            dimension: None,
        }
    }

    /// Reject writes whose vector length differs from `dimension`.
    /// `None` (the default) accepts any length.
    pub fn with_dimension(mut self, dimension: Option<usize>) -> Self {
        self.dimension = dimension;
        self
    }

    fn check_dimension(&self, embedding: &ItemEmbedding) -> Result<(), EmbeddingError> {
        match self.dimension {
            Some(expected) if embedding.vector.len() != expected => {
                Err(EmbeddingError::InvalidDimension {
                    expected,
                    actual: embedding.vector.len(),
                })
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

pub(super) fn store_err(e: sqlx::Error) -> EmbeddingError {
    EmbeddingError::Store(e.to_string())
}

/// Encode a vector as a JSON array. Non-finite components have no JSON
/// representation and are rejected.
pub(super) fn encode_vector(item_id: &str, vector: &[f64]) -> Result<String, EmbeddingError> {
    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(EmbeddingError::Encoding(format!(
            "item '{item_id}': component {pos} is not finite"
        )));
    }
    serde_json::to_string(vector)
        .map_err(|e| EmbeddingError::Encoding(format!("item '{item_id}': {e}")))
}

pub(super) fn decode_vector(item_id: &str, raw: &str) -> Result<Vec<f64>, EmbeddingError> {
    serde_json::from_str(raw)
        .map_err(|e| EmbeddingError::Encoding(format!("item '{item_id}': invalid vector: {e}")))
}

fn parse_datetime(item_id: &str, s: &str) -> Result<DateTime<Utc>, EmbeddingError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EmbeddingError::Encoding(format!("item '{item_id}': invalid timestamp: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn row_to_embedding(row: &sqlx::sqlite::SqliteRow) -> Result<ItemEmbedding, EmbeddingError> {
    let item_id: String = row.try_get("item_id").map_err(store_err)?;
    let vector: String = row.try_get("vector").map_err(store_err)?;
    let timestamp: String = row.try_get("timestamp").map_err(store_err)?;

    Ok(ItemEmbedding {
        vector: decode_vector(&item_id, &vector)?,
        timestamp: parse_datetime(&item_id, &timestamp)?,
        item_id,
    })
}

// ---------------------------------------------------------------------------
// EmbeddingStore implementation
// ---------------------------------------------------------------------------

impl<I: SimilarityIndex> EmbeddingStore for SqliteEmbeddingStore<I> {
    async fn get_embedding(&self, item_id: &str) -> Result<ItemEmbedding, EmbeddingError> {
        let row = sqlx::query(
            "SELECT item_id, vector, timestamp FROM item_embeddings WHERE item_id = ?",
        )
        .bind(item_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(store_err)?;

        match row {
            Some(row) => row_to_embedding(&row),
            None => Err(EmbeddingError::NotFound(item_id.to_string())),
        }
    }

    async fn batch_get_embeddings(
        &self,
        item_ids: &[String],
    ) -> Result<HashMap<String, ItemEmbedding>, EmbeddingError> {
        let mut results = HashMap::with_capacity(item_ids.len());

        for chunk in item_ids.chunks(BATCH_GET_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT item_id, vector, timestamp FROM item_embeddings WHERE item_id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            let rows = builder
                .build()
                .fetch_all(&self.pool.reader)
                .await
                .map_err(store_err)?;

            for row in &rows {
                let embedding = row_to_embedding(row)?;
                results.insert(embedding.item_id.clone(), embedding);
            }
        }

        Ok(results)
    }

    async fn store_embedding(&self, embedding: &ItemEmbedding) -> Result<(), EmbeddingError> {
        self.check_dimension(embedding)?;
        let vector = encode_vector(&embedding.item_id, &embedding.vector)?;

        sqlx::query(UPSERT_SQL)
            .bind(&embedding.item_id)
            .bind(&vector)
            .bind(format_datetime(&embedding.timestamp))
            .execute(&self.pool.writer)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn batch_store_embeddings(
        &self,
        embeddings: &[ItemEmbedding],
    ) -> Result<(), EmbeddingError> {
        if embeddings.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.writer.begin().await.map_err(store_err)?;

        for embedding in embeddings {
            // Returning early drops `tx`, which rolls back every prior write.
            self.check_dimension(embedding)?;
            let vector = encode_vector(&embedding.item_id, &embedding.vector)?;

            sqlx::query(UPSERT_SQL)
                .bind(&embedding.item_id)
                .bind(&vector)
                .bind(format_datetime(&embedding.timestamp))
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;

        tracing::debug!(count = embeddings.len(), "stored embedding batch");
        Ok(())
    }

    async fn delete_embedding(&self, item_id: &str) -> Result<(), EmbeddingError> {
        sqlx::query("DELETE FROM item_embeddings WHERE item_id = ?")
            .bind(item_id)
            .execute(&self.pool.writer)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn get_similar_items(
        &self,
        item_id: &str,
        n: usize,
    ) -> Result<Vec<Score>, EmbeddingError> {
        let source = self.get_embedding(item_id).await?;
        self.index.nearest(&source, n).await
    }

    async fn scan(
        &self,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<ItemEmbedding>, EmbeddingError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            "SELECT item_id, vector, timestamp FROM item_embeddings ORDER BY item_id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(store_err)?;

        let mut embeddings = Vec::with_capacity(rows.len());
        for row in &rows {
            embeddings.push(row_to_embedding(row)?);
        }
        Ok(embeddings)
    }
}
