//! Embedding persistence and similarity retrieval.
//!
//! This module defines the `EmbeddingStore` and `SimilarityIndex` traits that
//! the infrastructure layer implements, and the `NeighborIndexer` that walks
//! a store offline to produce precomputed neighbor lists.

pub mod index;
pub mod indexer;
pub mod store;
