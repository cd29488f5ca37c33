//! Candidate sets produced by the aggregator.
//!
//! A [`CandidateSet`] maps a category label to a ranked list of item ids.
//! The empty label [`ALL_CATEGORIES`] holds candidates drawn from every
//! category.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved category label meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "";

/// Ranked candidate item ids per category.
///
/// Each list is ordered by descending aggregated score and is bounded by the
/// configured cache size. Built fresh per request and owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSet {
    lists: HashMap<String, Vec<String>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ranked list for a category, replacing any previous one.
    pub fn insert(&mut self, category: impl Into<String>, items: Vec<String>) {
        self.lists.insert(category.into(), items);
    }

    /// Ranked list for a category, if the category was requested.
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.lists.get(category).map(Vec::as_slice)
    }

    /// Ranked list for the reserved all-categories label.
    pub fn all(&self) -> Option<&[String]> {
        self.get(ALL_CATEGORIES)
    }

    /// Iterate over (category, ranked ids) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.lists
            .iter()
            .map(|(category, items)| (category.as_str(), items.as_slice()))
    }

    /// Number of categories present (including the all-categories label).
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.lists
    }
}
