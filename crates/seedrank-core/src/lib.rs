//! Business logic and port trait definitions for seedrank.
//!
//! This crate defines the "ports" (store, index, and collaborator traits)
//! that the infrastructure layer implements, plus the algorithms that run on
//! top of them: cosine ranking, bounded top-K selection, candidate
//! aggregation, and offline neighbor indexing. It depends only on
//! `seedrank-types` -- never on `seedrank-infra` or any database/IO crate.

pub mod embedding;
pub mod recommend;
pub mod similarity;
pub mod topk;
