//! `srank neighbors`: precompute nearest-neighbor lists for every item.
//!
//! Output is newline-delimited JSON, one object per item, suitable for
//! loading into the neighbor cache the recommender reads from.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use seedrank_core::embedding::indexer::{IndexSummary, NeighborIndexer};
use seedrank_core::embedding::store::EmbeddingStore;
use seedrank_types::embedding::Score;

use crate::state::AppState;

#[derive(Serialize)]
struct NeighborLine<'a> {
    item_id: &'a str,
    neighbors: &'a [Score],
}

fn write_line<W: Write>(out: &mut W, item_id: &str, neighbors: &[Score]) -> io::Result<()> {
    serde_json::to_writer(&mut *out, &NeighborLine { item_id, neighbors })?;
    out.write_all(b"\n")
}

/// Index every item of `store` and write one NDJSON line per item to `out`.
async fn write_neighbors<S, W>(
    store: &S,
    neighbors: usize,
    page_size: u64,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<IndexSummary>
where
    S: EmbeddingStore,
    W: Write,
{
    let indexer = NeighborIndexer::new(store, neighbors, page_size);
    let result = indexer
        .run(cancel, |item_id, scores| write_line(out, item_id, &scores))
        .await;
    out.flush()?;
    Ok(result?)
}

/// Run the neighbor indexer over the whole store.
///
/// Ctrl+C cancels the run between items; lines already written stay valid.
pub async fn run(
    state: &AppState,
    count: Option<usize>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let neighbors = count.unwrap_or(state.config.recommend.num_similar);
    let page_size = state.config.embeddings.scan_page_size;

    // Locked per write, never for the whole run.
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
                tracing::warn!("interrupt received, stopping neighbor indexing");
            }
        })
    };

    let result = write_neighbors(
        state.store.as_ref(),
        neighbors,
        page_size,
        &cancel,
        &mut out,
    )
    .await;
    ctrl_c.abort();
    let summary = result?;

    if output.is_none() {
        // stdout carries the neighbor lists
        eprintln!("{} {} neighbor lists", style("ok").green(), summary.emitted);
    } else if json {
        let result = serde_json::json!({
            "visited": summary.visited,
            "emitted": summary.emitted,
            "vanished": summary.vanished,
            "neighbors": neighbors,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} Wrote {} neighbor lists ({} vanished during the run)",
            style("ok").green(),
            style(summary.emitted).bold(),
            summary.vanished,
        );
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use seedrank_infra::sqlite::embedding::SqliteEmbeddingStore;
    use seedrank_infra::sqlite::pool::{DatabasePool, database_url};
    use seedrank_types::embedding::ItemEmbedding;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_line_is_single_json_object() {
        let mut buf = Vec::new();
        write_line(&mut buf, "a", &[Score::new("b", 0.5), Score::new("c", 0.25)]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["item_id"], "a");
        assert_eq!(value["neighbors"][0]["id"], "b");
        assert_eq!(value["neighbors"][1]["score"], 0.25);
    }

    #[tokio::test]
    async fn test_every_output_line_is_json_with_mixed_dimensions() {
        let tmp = TempDir::new().unwrap();
        let pool = DatabasePool::new(&database_url(tmp.path())).await.unwrap();
        let store = SqliteEmbeddingStore::new(pool);
        store
            .batch_store_embeddings(&[
                ItemEmbedding::new("a", vec![1.0, 0.0]),
                ItemEmbedding::new("b", vec![0.9, 0.1]),
                ItemEmbedding::new("c", vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let mut buf = Vec::new();
        let summary = write_neighbors(&store, 2, 0, &CancellationToken::new(), &mut buf)
            .await
            .unwrap();
        assert_eq!(summary.emitted, 3);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let ids: Vec<&str> = lines.iter().map(|l| l["item_id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(lines[0]["neighbors"][0]["id"], "b");
        assert_eq!(lines[2]["neighbors"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let pool = DatabasePool::new(&database_url(tmp.path())).await.unwrap();
        let store = SqliteEmbeddingStore::new(pool);
        store
            .store_embedding(&ItemEmbedding::new("a", vec![1.0]))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut buf = Vec::new();
        let err = write_neighbors(&store, 2, 0, &cancel, &mut buf)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cancelled"));
        assert!(buf.is_empty());
    }
}
