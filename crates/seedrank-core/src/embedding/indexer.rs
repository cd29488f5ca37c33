//! Offline neighbor list producer.
//!
//! Walks the embedding store page by page and computes each item's nearest
//! neighbors. The resulting lists are what the precomputed-neighbor cache
//! serves to the candidate aggregator at request time.

use seedrank_types::embedding::Score;
use seedrank_types::error::EmbeddingError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::store::EmbeddingStore;

/// Errors from a neighbor indexing run.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error(transparent)]
    Store(#[from] EmbeddingError),

    #[error("neighbor sink failed for item '{item_id}': {message}")]
    Sink { item_id: String, message: String },

    #[error("neighbor indexing cancelled after {visited} items")]
    Cancelled { visited: u64 },
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Items returned by the scan.
    pub visited: u64,
    /// Neighbor lists handed to the sink.
    pub emitted: u64,
    /// Items deleted between the scan and their similarity query.
    pub vanished: u64,
}

pub struct NeighborIndexer<'a, S> {
    store: &'a S,
    neighbors: usize,
    page_size: u64,
}

impl<'a, S: EmbeddingStore> NeighborIndexer<'a, S> {
    /// `page_size = 0` reads the whole store in a single scan.
    pub fn new(store: &'a S, neighbors: usize, page_size: u64) -> Self {
        Self {
            store,
            neighbors,
            page_size,
        }
    }

    /// Compute neighbors for every stored item, in ascending id order, and
    /// pass each list to `sink`.
    pub async fn run<F, E>(
        &self,
        cancel: &CancellationToken,
        mut sink: F,
    ) -> Result<IndexSummary, IndexerError>
    where
        F: FnMut(&str, Vec<Score>) -> Result<(), E>,
        E: std::fmt::Display,
    {
        let mut summary = IndexSummary::default();
        let limit = (self.page_size > 0).then_some(self.page_size);
        let mut offset = 0u64;

        loop {
            let page = self.store.scan(offset, limit).await?;
            let page_len = page.len() as u64;

            for embedding in page {
                if cancel.is_cancelled() {
                    return Err(IndexerError::Cancelled {
                        visited: summary.visited,
                    });
                }
                summary.visited += 1;

                let scores = match self
                    .store
                    .get_similar_items(&embedding.item_id, self.neighbors)
                    .await
                {
                    Ok(scores) => scores,
                    Err(EmbeddingError::NotFound(_)) => {
                        tracing::debug!(item_id = %embedding.item_id, "item vanished during indexing");
                        summary.vanished += 1;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };

                sink(&embedding.item_id, scores).map_err(|e| IndexerError::Sink {
                    item_id: embedding.item_id.clone(),
                    message: e.to_string(),
                })?;
                summary.emitted += 1;
            }

            match limit {
                Some(limit) if page_len == limit => offset += page_len,
                _ => break,
            }
        }

        tracing::info!(
            visited = summary.visited,
            emitted = summary.emitted,
            vanished = summary.vanished,
            "neighbor indexing complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    use seedrank_types::embedding::ItemEmbedding;

    use super::*;
    use crate::embedding::index::ExactRanker;

    /// In-memory store used to drive the indexer without a database.
    #[derive(Default)]
    struct MemoryStore {
        items: Mutex<BTreeMap<String, ItemEmbedding>>,
        scans: Mutex<Vec<(u64, Option<u64>)>>,
    }

    impl MemoryStore {
        fn with(items: &[(&str, Vec<f64>)]) -> Self {
            let store = Self::default();
            {
                let mut map = store.items.lock().unwrap();
                for (id, v) in items {
                    map.insert(id.to_string(), ItemEmbedding::new(*id, v.clone()));
                }
            }
            store
        }
    }

    impl EmbeddingStore for MemoryStore {
        async fn get_embedding(&self, item_id: &str) -> Result<ItemEmbedding, EmbeddingError> {
            self.items
                .lock()
                .unwrap()
                .get(item_id)
                .cloned()
                .ok_or_else(|| EmbeddingError::NotFound(item_id.to_string()))
        }

        async fn batch_get_embeddings(
            &self,
            item_ids: &[String],
        ) -> Result<HashMap<String, ItemEmbedding>, EmbeddingError> {
            let items = self.items.lock().unwrap();
            Ok(item_ids
                .iter()
                .filter_map(|id| items.get(id).map(|e| (id.clone(), e.clone())))
                .collect())
        }

        async fn store_embedding(&self, embedding: &ItemEmbedding) -> Result<(), EmbeddingError> {
            self.items
                .lock()
                .unwrap()
                .insert(embedding.item_id.clone(), embedding.clone());
            Ok(())
        }

        async fn batch_store_embeddings(
            &self,
            embeddings: &[ItemEmbedding],
        ) -> Result<(), EmbeddingError> {
            for e in embeddings {
                self.store_embedding(e).await?;
            }
            Ok(())
        }

        async fn delete_embedding(&self, item_id: &str) -> Result<(), EmbeddingError> {
            self.items.lock().unwrap().remove(item_id);
            Ok(())
        }

        async fn get_similar_items(
            &self,
            item_id: &str,
            n: usize,
        ) -> Result<Vec<Score>, EmbeddingError> {
            let source = self.get_embedding(item_id).await?;
            let items = self.items.lock().unwrap();
            let mut ranker = ExactRanker::new(&source, n);
            for (id, e) in items.iter() {
                ranker.offer(id.clone(), &e.vector);
            }
            Ok(ranker.finish())
        }

        async fn scan(
            &self,
            offset: u64,
            limit: Option<u64>,
        ) -> Result<Vec<ItemEmbedding>, EmbeddingError> {
            self.scans.lock().unwrap().push((offset, limit));
            let items = self.items.lock().unwrap();
            let iter = items.values().skip(offset as usize).cloned();
            Ok(match limit {
                Some(limit) => iter.take(limit as usize).collect(),
                None => iter.collect(),
            })
        }
    }

    fn sample_store() -> MemoryStore {
        MemoryStore::with(&[
            ("item1", vec![1.0, 0.0, 0.0]),
            ("item2", vec![0.866, 0.5, 0.0]),
            ("item3", vec![0.0, 1.0, 0.0]),
            ("item4", vec![0.0, 0.0, 1.0]),
            ("item5", vec![0.5, 0.5, 0.5]),
        ])
    }

    #[tokio::test]
    async fn test_run_visits_every_item_in_id_order() {
        let store = sample_store();
        let indexer = NeighborIndexer::new(&store, 2, 2);
        let mut seen = Vec::new();

        let summary = indexer
            .run(&CancellationToken::new(), |id, scores| {
                assert_eq!(scores.len(), 2);
                assert!(scores.iter().all(|s| s.id != id));
                seen.push(id.to_string());
                Ok::<_, String>(())
            })
            .await
            .unwrap();

        assert_eq!(seen, ["item1", "item2", "item3", "item4", "item5"]);
        assert_eq!(summary.visited, 5);
        assert_eq!(summary.emitted, 5);
        assert_eq!(summary.vanished, 0);

        // 5 items with page size 2 -> pages at 0, 2, 4
        let offsets: Vec<u64> = store.scans.lock().unwrap().iter().map(|s| s.0).collect();
        assert_eq!(offsets, [0, 2, 4]);
    }

    #[tokio::test]
    async fn test_zero_page_size_scans_once_unbounded() {
        let store = sample_store();
        let indexer = NeighborIndexer::new(&store, 1, 0);
        let summary = indexer
            .run(&CancellationToken::new(), |_, _| Ok::<_, String>(()))
            .await
            .unwrap();

        assert_eq!(summary.emitted, 5);
        assert_eq!(*store.scans.lock().unwrap(), [(0, None)]);
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_run() {
        let store = sample_store();
        let indexer = NeighborIndexer::new(&store, 1, 10);
        let err = indexer
            .run(&CancellationToken::new(), |id, _| {
                if id == "item3" {
                    Err("disk full")
                } else {
                    Ok(())
                }
            })
            .await
            .unwrap_err();

        match err {
            IndexerError::Sink { item_id, message } => {
                assert_eq!(item_id, "item3");
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_item_deleted_mid_run_counts_as_vanished() {
        let store = sample_store();
        let indexer = NeighborIndexer::new(&store, 2, 10);
        let mut seen = Vec::new();

        let summary = indexer
            .run(&CancellationToken::new(), |id, _| {
                if id == "item2" {
                    store.items.lock().unwrap().remove("item4");
                }
                seen.push(id.to_string());
                Ok::<_, String>(())
            })
            .await
            .unwrap();

        assert_eq!(seen, ["item1", "item2", "item3", "item5"]);
        assert_eq!(summary.visited, 5);
        assert_eq!(summary.emitted, 4);
        assert_eq!(summary.vanished, 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_error() {
        let store = sample_store();
        let indexer = NeighborIndexer::new(&store, 1, 10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = indexer
            .run(&cancel, |_, _| Ok::<_, String>(()))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexerError::Cancelled { visited: 0 }));
    }
}
