//! Collaborator traits consumed by the candidate aggregator.
//!
//! The feedback repository and the precomputed-neighbor cache are external
//! services; these traits are the seams they plug into.

use chrono::{DateTime, Utc};
use seedrank_types::embedding::Score;
use seedrank_types::error::RepositoryError;
use seedrank_types::feedback::Feedback;

/// Neighbor-cache namespace holding image-embedding similarity lists.
pub const IMAGE_SIMILAR: &str = "image-similar";

/// Source of user feedback history.
pub trait FeedbackRepository: Send + Sync {
    /// Feedback left by `user_id` before `before` (all time when `None`),
    /// restricted to `feedback_types` (all types when empty).
    fn get_user_feedback(
        &self,
        user_id: &str,
        before: Option<DateTime<Utc>>,
        feedback_types: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Feedback>, RepositoryError>> + Send;
}

/// Precomputed nearest-neighbor lists, keyed by namespace and subject item.
pub trait NeighborCache: Send + Sync {
    /// Up to `count` neighbors of `item_id` starting at `offset`, best first,
    /// restricted to `categories`.
    fn search_scores(
        &self,
        namespace: &str,
        item_id: &str,
        categories: &[String],
        offset: usize,
        count: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Score>, RepositoryError>> + Send;
}

/// Whether an item may currently be recommended (in stock, not hidden, ...).
pub trait ItemAvailability: Send + Sync {
    fn is_available(&self, item_id: &str) -> bool;
}

impl<F> ItemAvailability for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_available(&self, item_id: &str) -> bool {
        self(item_id)
    }
}
