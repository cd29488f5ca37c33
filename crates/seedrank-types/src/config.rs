//! Global configuration types for seedrank.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! candidate aggregator and the embedding store.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.seedrank/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub recommend: RecommendConfig,

    #[serde(default)]
    pub embeddings: EmbeddingStoreConfig,
}

/// Settings consumed by the candidate aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Maximum neighbors fetched from the neighbor cache per seed item.
    #[serde(default = "default_num_similar")]
    pub num_similar: usize,

    /// Multiplier applied to every neighbor score before accumulation.
    #[serde(default = "default_image_weight")]
    pub image_weight: f64,

    /// Maximum candidates returned per category.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Feedback types that count as positive signal.
    #[serde(default)]
    pub positive_feedback_types: Vec<String>,

    /// Neighbor-cache lookups in flight at once for one request.
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
}

fn default_num_similar() -> usize {
    100
}

fn default_image_weight() -> f64 {
    1.0
}

fn default_cache_size() -> usize {
    100
}

fn default_max_concurrent_lookups() -> usize {
    32
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            num_similar: default_num_similar(),
            image_weight: default_image_weight(),
            cache_size: default_cache_size(),
            positive_feedback_types: Vec::new(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
        }
    }
}

/// Settings for the embedding store and the offline neighbor indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingStoreConfig {
    /// When set, writes whose vector length differs are rejected.
    #[serde(default)]
    pub dimension: Option<usize>,

    /// Page size used when the neighbor indexer walks the store.
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: u64,
}

fn default_scan_page_size() -> u64 {
    1000
}

impl Default for EmbeddingStoreConfig {
    fn default() -> Self {
        Self {
            dimension: None,
            scan_page_size: default_scan_page_size(),
        }
    }
}
