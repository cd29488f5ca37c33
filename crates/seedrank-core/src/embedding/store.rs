//! Embedding store trait.
//!
//! Defines the interface for durable item-embedding storage with similarity
//! retrieval. Implementations (e.g. SQLite) live in seedrank-infra.

use std::collections::HashMap;

use seedrank_types::embedding::{ItemEmbedding, Score};
use seedrank_types::error::EmbeddingError;

/// Trait for item-keyed embedding persistence and similarity search.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in seedrank-infra.
pub trait EmbeddingStore: Send + Sync {
    /// Get one item's embedding.
    ///
    /// Fails with [`EmbeddingError::NotFound`] if the item has no embedding and
    /// [`EmbeddingError::Encoding`] if the stored payload cannot be decoded.
    fn get_embedding(
        &self,
        item_id: &str,
    ) -> impl std::future::Future<Output = Result<ItemEmbedding, EmbeddingError>> + Send;

    /// Get embeddings for several items. Missing ids are omitted from the map;
    /// any decode failure fails the whole call.
    fn batch_get_embeddings(
        &self,
        item_ids: &[String],
    ) -> impl std::future::Future<Output = Result<HashMap<String, ItemEmbedding>, EmbeddingError>> + Send;

    /// Store an embedding (upsert).
    fn store_embedding(
        &self,
        embedding: &ItemEmbedding,
    ) -> impl std::future::Future<Output = Result<(), EmbeddingError>> + Send;

    /// Store several embeddings atomically. Either every embedding is written
    /// or none is.
    fn batch_store_embeddings(
        &self,
        embeddings: &[ItemEmbedding],
    ) -> impl std::future::Future<Output = Result<(), EmbeddingError>> + Send;

    /// Delete an item's embedding. No-op if it does not exist.
    fn delete_embedding(
        &self,
        item_id: &str,
    ) -> impl std::future::Future<Output = Result<(), EmbeddingError>> + Send;

    /// Find the `n` items most similar to `item_id`, best first, never
    /// including `item_id` itself.
    fn get_similar_items(
        &self,
        item_id: &str,
        n: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Score>, EmbeddingError>> + Send;

    /// Page through stored embeddings in ascending item id order.
    /// `limit = None` returns everything from `offset` onward.
    fn scan(
        &self,
        offset: u64,
        limit: Option<u64>,
    ) -> impl std::future::Future<Output = Result<Vec<ItemEmbedding>, EmbeddingError>> + Send;
}
