//! Application state wiring the embedding store for CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use seedrank_infra::config::{load_global_config, resolve_data_dir};
use seedrank_infra::sqlite::embedding::SqliteEmbeddingStore;
use seedrank_infra::sqlite::pool::{DatabasePool, database_url};
use seedrank_types::config::GlobalConfig;

/// Shared state handed to every command handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteEmbeddingStore>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, and open the database.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let store =
            SqliteEmbeddingStore::new(db_pool).with_dimension(config.embeddings.dimension);

        Ok(Self {
            store: Arc::new(store),
            config,
            data_dir,
        })
    }
}
