//! Shared domain types for seedrank.
//!
//! This crate contains the core domain types used across the seedrank
//! workspace: item embeddings, similarity scores, candidate sets, feedback
//! records, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod candidate;
pub mod config;
pub mod embedding;
pub mod error;
pub mod feedback;
