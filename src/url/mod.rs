//! URL handling module for Sumi-Scribe
//!
//! This module provides crawl target normalization, the ordered target set,
//! domain-scope link filtering and artifact file naming.

mod filename;
mod filter;
mod normalize;

use indexmap::IndexSet;
use url::Url;

// Re-export main functions
pub use filename::{artifact_file_name, artifact_file_name_str, INDEX_NAME};
pub use filter::filter_links;
pub use normalize::normalize_target;

/// An insertion-ordered set of normalized crawl targets
///
/// Iteration order is the order in which targets were first inserted, which
/// makes dispatch order deterministic for a given discovery or input list.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    targets: IndexSet<String>,
}

impl TargetSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a normalized target; returns false if it was already present
    pub fn insert(&mut self, url: Url) -> bool {
        self.targets.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates over targets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(String::as_str)
    }
}

impl IntoIterator for TargetSet {
    type Item = String;
    type IntoIter = indexmap::set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.into_iter()
    }
}
