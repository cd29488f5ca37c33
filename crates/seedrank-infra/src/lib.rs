//! Infrastructure layer for seedrank.
//!
//! Contains implementations of the traits defined in `seedrank-core`: the
//! SQLite embedding store with its exact scan index, plus data-directory and
//! `config.toml` loading.

pub mod config;
pub mod sqlite;
