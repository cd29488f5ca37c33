//! Image-similarity candidate aggregation.
//!
//! Turns a user's positive feedback into ranked, per-category candidate
//! lists. Every seed item's precomputed neighbors are looked up concurrently
//! (one task per seed and category); neighbors reached from several seeds
//! accumulate the sum of their weighted scores, and the best `cache_size`
//! per category are kept.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use seedrank_types::candidate::{ALL_CATEGORIES, CandidateSet};
use seedrank_types::config::RecommendConfig;
use seedrank_types::embedding::Score;
use seedrank_types::error::{RecommendError, RepositoryError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::ports::{FeedbackRepository, IMAGE_SIMILAR, ItemAvailability, NeighborCache};
use crate::topk::TopKFilter;

/// Result of one (seed, category) neighbor lookup.
enum Lookup {
    Done {
        category: usize,
        seed: String,
        result: Result<Vec<Score>, RepositoryError>,
    },
    Cancelled,
}

/// Stateless candidate generator over the feedback and neighbor-cache
/// collaborators.
pub struct CandidateAggregator<F, N> {
    feedback: Arc<F>,
    neighbors: Arc<N>,
    config: RecommendConfig,
}

impl<F, N> CandidateAggregator<F, N>
where
    F: FeedbackRepository + 'static,
    N: NeighborCache + 'static,
{
    pub fn new(feedback: Arc<F>, neighbors: Arc<N>, config: RecommendConfig) -> Self {
        Self {
            feedback,
            neighbors,
            config,
        }
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Build candidate lists for `user_id`.
    ///
    /// The result always holds the [`ALL_CATEGORIES`] list plus one list per
    /// requested category, each possibly empty. Items in `exclude` or not
    /// available per `availability` never appear. Returns the elapsed time
    /// alongside the candidates.
    ///
    /// Fails only if the feedback repository fails or `cancel` fires; a
    /// failing neighbor lookup for one seed is logged and skipped.
    #[tracing::instrument(
        name = "recommend",
        skip(self, categories, exclude, availability, cancel),
        fields(category_count = categories.len())
    )]
    pub async fn recommend<A>(
        &self,
        user_id: &str,
        categories: &[String],
        exclude: &HashSet<String>,
        availability: &A,
        cancel: &CancellationToken,
    ) -> Result<(CandidateSet, Duration), RecommendError>
    where
        A: ItemAvailability + ?Sized,
    {
        let start = Instant::now();

        let seeds = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RecommendError::Cancelled),
            seeds = self.load_positive_items(user_id) => seeds?,
        };

        let labels = category_labels(categories);
        let mut scores: Vec<HashMap<String, f64>> = vec![HashMap::new(); labels.len()];

        // At most `max_concurrent_lookups` tasks exist at a time; the next
        // (category, seed) pair is spawned as each one completes.
        let limit = self.config.max_concurrent_lookups.max(1);
        let mut pending = labels
            .iter()
            .enumerate()
            .flat_map(|(category, label)| seeds.iter().map(move |seed| (category, label, seed)));
        let mut lookups = JoinSet::new();

        loop {
            while lookups.len() < limit && !cancel.is_cancelled() {
                let Some((category, label, seed)) = pending.next() else {
                    break;
                };
                let cache = Arc::clone(&self.neighbors);
                let token = cancel.clone();
                let seed = seed.clone();
                let filter = vec![label.clone()];
                let count = self.config.num_similar;

                lookups.spawn(async move {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => Lookup::Cancelled,
                        result = cache.search_scores(IMAGE_SIMILAR, &seed, &filter, 0, count) => {
                            Lookup::Done { category, seed, result }
                        }
                    }
                });
            }

            let Some(joined) = lookups.join_next().await else {
                break;
            };
            let (category, seed, result) = match joined {
                Ok(Lookup::Done {
                    category,
                    seed,
                    result,
                }) => (category, seed, result),
                Ok(Lookup::Cancelled) => continue,
                Err(e) => {
                    tracing::error!(user_id, error = %e, "neighbor lookup task failed");
                    continue;
                }
            };

            let neighbors = match result {
                Ok(neighbors) => neighbors,
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        item_id = %seed,
                        category = %labels[category],
                        error = %e,
                        "failed to load similar items"
                    );
                    continue;
                }
            };

            let acc = &mut scores[category];
            for neighbor in neighbors {
                if exclude.contains(&neighbor.id) || !availability.is_available(&neighbor.id) {
                    continue;
                }
                *acc.entry(neighbor.id).or_insert(0.0) += neighbor.score * self.config.image_weight;
            }
        }

        if cancel.is_cancelled() {
            return Err(RecommendError::Cancelled);
        }

        let mut candidates = CandidateSet::new();
        for (label, acc) in labels.into_iter().zip(scores) {
            let mut filter = TopKFilter::new(self.config.cache_size);
            for (id, score) in acc {
                filter.push(id, score);
            }
            candidates.insert(label, filter.into_sorted_items());
        }

        let elapsed = start.elapsed();
        tracing::debug!(
            seeds = seeds.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "candidates aggregated"
        );
        Ok((candidates, elapsed))
    }

    /// Item ids of the user's positive feedback up to now.
    ///
    /// One seed per feedback record: an item with several positive records
    /// contributes its neighbors once per record.
    async fn load_positive_items(&self, user_id: &str) -> Result<Vec<String>, RecommendError> {
        let feedback = self
            .feedback
            .get_user_feedback(
                user_id,
                Some(Utc::now()),
                &self.config.positive_feedback_types,
            )
            .await
            .map_err(RecommendError::Feedback)?;

        Ok(feedback.into_iter().map(|f| f.item_id).collect())
    }
}

/// The all-categories label followed by the requested categories, without
/// duplicates.
fn category_labels(categories: &[String]) -> Vec<String> {
    let mut labels = vec![ALL_CATEGORIES.to_string()];
    for category in categories {
        if !labels.contains(category) {
            labels.push(category.clone());
        }
    }
    labels
}
