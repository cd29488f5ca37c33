//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a
//! multi-connection reader pool for concurrent lookups and similarity scans
//! with a single-connection writer pool for serialized upserts and deletes.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Create a new DatabasePool with split reader/writer connections.
    ///
    /// Runs migrations automatically on the writer pool.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Migrations must land before the read-only pool opens the file
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        tracing::debug!(url = database_url, "database pool ready");
        Ok(Self { reader, writer })
    }
}

/// SQLite URL for the database file inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("seedrank.db").display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creates_embeddings_table() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());

        let pool = DatabasePool::new(&url).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, ["item_embeddings"]);
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());

        let pool = DatabasePool::new(&url).await.unwrap();

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[test]
    fn test_database_url() {
        let url = database_url(Path::new("/tmp/seedrank"));
        assert_eq!(url, "sqlite:///tmp/seedrank/seedrank.db?mode=rwc");
    }
}
