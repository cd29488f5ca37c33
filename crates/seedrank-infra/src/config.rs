//! Global configuration loader for seedrank.
//!
//! Reads `config.toml` from the data directory (`~/.seedrank/` by default)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use seedrank_types::config::GlobalConfig;

/// Resolve the data directory.
///
/// Priority:
/// 1. `SEEDRANK_DATA_DIR` environment variable
/// 2. `~/.seedrank`
/// 3. `.seedrank` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SEEDRANK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".seedrank");
    }

    PathBuf::from(".seedrank")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.recommend.cache_size, 100);
        assert!(config.embeddings.dimension.is_none());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[recommend]
num_similar = 25
cache_size = 50
positive_feedback_types = ["star"]

[embeddings]
dimension = 3
scan_page_size = 200
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.recommend.num_similar, 25);
        assert_eq!(config.recommend.cache_size, 50);
        assert_eq!(config.recommend.positive_feedback_types, ["star"]);
        assert_eq!(config.embeddings.dimension, Some(3));
        assert_eq!(config.embeddings.scan_page_size, 200);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.recommend.num_similar, 100);
    }
}
