//! Embedding store subcommands: put, import, get, delete, similar, scan.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Deserialize;

use seedrank_core::embedding::store::EmbeddingStore;
use seedrank_types::embedding::{ItemEmbedding, Score};

use crate::state::AppState;

/// Components shown in table output before the vector is abbreviated.
const PREVIEW_COMPONENTS: usize = 6;

/// One line of an import file.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    item_id: String,
    vector: Vec<f64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl From<ImportRecord> for ItemEmbedding {
    fn from(record: ImportRecord) -> Self {
        match record.timestamp {
            Some(timestamp) => ItemEmbedding {
                item_id: record.item_id,
                vector: record.vector,
                timestamp,
            },
            None => ItemEmbedding::new(record.item_id, record.vector),
        }
    }
}

/// Parse a comma-separated list of numbers into a vector.
pub fn parse_vector(raw: &str) -> Result<Vec<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .enumerate()
        .map(|(i, part)| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("component {i} ('{}') is not a number", part.trim()))
        })
        .collect()
}

/// Parse JSON Lines content into embeddings. Blank lines are ignored.
fn parse_import(content: &str) -> Result<Vec<ItemEmbedding>> {
    let mut embeddings = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: ImportRecord = serde_json::from_str(line)
            .with_context(|| format!("invalid record on line {}", idx + 1))?;
        embeddings.push(record.into());
    }
    Ok(embeddings)
}

fn vector_preview(vector: &[f64]) -> String {
    let shown: Vec<String> = vector
        .iter()
        .take(PREVIEW_COMPONENTS)
        .map(|v| format!("{v:.4}"))
        .collect();
    if vector.len() > PREVIEW_COMPONENTS {
        format!("[{}, ... ({} total)]", shown.join(", "), vector.len())
    } else {
        format!("[{}]", shown.join(", "))
    }
}

/// Store one embedding, replacing any existing one for the item.
pub async fn put(state: &AppState, item_id: &str, raw_vector: &str, json: bool) -> Result<()> {
    let vector = parse_vector(raw_vector)?;
    let embedding = ItemEmbedding::new(item_id, vector);
    state.store.store_embedding(&embedding).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&embedding)?);
    } else {
        println!();
        println!(
            "  {} Stored '{}' ({} dimensions)",
            style("ok").green(),
            style(item_id).cyan(),
            embedding.dimension(),
        );
        println!();
    }
    Ok(())
}

/// Import a JSON Lines file as one atomic batch.
pub async fn import(state: &AppState, path: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let embeddings = parse_import(&content)?;

    state.store.batch_store_embeddings(&embeddings).await?;
    tracing::info!(count = embeddings.len(), path = %path.display(), "imported embeddings");

    if json {
        let result = serde_json::json!({
            "imported": embeddings.len(),
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} Imported {} embeddings from {}",
            style("ok").green(),
            style(embeddings.len()).bold(),
            style(path.display()).dim(),
        );
        println!();
    }
    Ok(())
}

/// Show one item's embedding.
pub async fn get(state: &AppState, item_id: &str, json: bool) -> Result<()> {
    let embedding = match state.store.get_embedding(item_id).await {
        Ok(embedding) => embedding,
        Err(e) if e.is_not_found() => bail!("No embedding stored for '{item_id}'"),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&embedding)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&embedding.item_id).cyan().bold());
    println!("  {:<12} {}", style("Dimensions").dim(), embedding.dimension());
    println!(
        "  {:<12} {}",
        style("Updated").dim(),
        embedding.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {:<12} {}", style("Vector").dim(), vector_preview(&embedding.vector));
    println!();
    Ok(())
}

/// Delete an item's embedding. Deleting a missing item is not an error.
pub async fn delete(state: &AppState, item_id: &str, json: bool) -> Result<()> {
    state.store.delete_embedding(item_id).await?;

    if json {
        let result = serde_json::json!({ "deleted": item_id });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("  {} Deleted '{}'", style("ok").green(), style(item_id).cyan());
        println!();
    }
    Ok(())
}

/// List the `count` items most similar to `item_id`.
pub async fn similar(state: &AppState, item_id: &str, count: usize, json: bool) -> Result<()> {
    let scores = match state.store.get_similar_items(item_id, count).await {
        Ok(scores) => scores,
        Err(e) if e.is_not_found() => bail!("No embedding stored for '{item_id}'"),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    if scores.is_empty() {
        println!();
        println!("  No similar items for '{}'.", style(item_id).cyan());
        println!();
        return Ok(());
    }

    println!();
    println!("{}", score_table(&scores));
    println!();
    Ok(())
}

fn score_table(scores: &[Score]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(Color::DarkGrey),
            Cell::new("Item").fg(Color::White),
            Cell::new("Score").fg(Color::White),
        ]);

    for (rank, score) in scores.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1).fg(Color::DarkGrey),
            Cell::new(&score.id).fg(Color::Cyan),
            Cell::new(format!("{:.6}", score.score)),
        ]);
    }
    table
}

/// Page through stored embeddings in item id order.
pub async fn scan(state: &AppState, offset: u64, limit: Option<u64>, json: bool) -> Result<()> {
    let embeddings = state.store.scan(offset, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&embeddings)?);
        return Ok(());
    }

    if embeddings.is_empty() {
        println!();
        println!("  No embeddings stored.");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Item").fg(Color::White),
            Cell::new("Dim").fg(Color::White),
            Cell::new("Updated").fg(Color::White),
            Cell::new("Vector").fg(Color::White),
        ]);

    for embedding in &embeddings {
        table.add_row(vec![
            Cell::new(&embedding.item_id).fg(Color::Cyan),
            Cell::new(embedding.dimension()),
            Cell::new(embedding.timestamp.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::DarkGrey),
            Cell::new(vector_preview(&embedding.vector)),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} rows from offset {}",
        style(embeddings.len()).bold(),
        offset
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("1, -0.5,2e-1").unwrap(), vec![1.0, -0.5, 0.2]);
        assert!(parse_vector("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_vector_rejects_garbage() {
        let err = parse_vector("1.0,abc").unwrap_err();
        assert!(err.to_string().contains("component 1"));
    }

    #[test]
    fn test_parse_import_with_and_without_timestamp() {
        let content = r#"{"item_id":"a","vector":[1.0,0.0],"timestamp":"2024-01-02T03:04:05Z"}

{"item_id":"b","vector":[0.0,1.0]}
"#;
        let embeddings = parse_import(content).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].item_id, "a");
        assert_eq!(
            embeddings[0].timestamp.to_rfc3339(),
            "2024-01-02T03:04:05+00:00"
        );
        assert_eq!(embeddings[1].vector, vec![0.0, 1.0]);
    }

    #[test]
    fn test_parse_import_reports_line_number() {
        let content = "{\"item_id\":\"a\",\"vector\":[1.0]}\nnot json\n";
        let err = parse_import(content).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_vector_preview_abbreviates_long_vectors() {
        assert_eq!(vector_preview(&[1.0, 0.5]), "[1.0000, 0.5000]");
        let long = vec![0.0; 10];
        assert!(vector_preview(&long).ends_with("... (10 total)]"));
    }
}
