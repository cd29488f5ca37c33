//! SQLite storage layer.
//!
//! The embedding store and its brute-force similarity index, backed by
//! SQLite with WAL mode and split read/write connection pools.

pub mod embedding;
pub mod pool;
pub mod scan_index;
