//! Embedding types.
//!
//! An [`ItemEmbedding`] is the stored vector for one item. A [`Score`] is a
//! transient (id, relevance) pair produced by similarity queries and by the
//! candidate aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item's embedding vector as held by the embedding store.
///
/// `item_id` is the unique key: storing an embedding for an id that already
/// exists replaces the previous vector and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEmbedding {
    pub item_id: String,
    pub vector: Vec<f64>,
    /// When this embedding was last written.
    pub timestamp: DateTime<Utc>,
}

impl ItemEmbedding {
    /// Create an embedding stamped with the current time.
    pub fn new(item_id: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            item_id: item_id.into(),
            vector,
            timestamp: Utc::now(),
        }
    }

    /// Number of components in the vector.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// A candidate item with its similarity or aggregated relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    pub score: f64,
}

impl Score {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}
