//! Data structures for resuming an interrupted scan.

use std::collections::HashSet;

use crate::duplicates::ClassificationStore;

/// File names that a resumed scan must not hash again.
///
/// Matching is by bare file name, not full path, because the walker hands
/// out names per directory. Two files with the same name in different
/// directories are therefore indistinguishable: once either has been
/// recorded, the other is skipped too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    names: HashSet<String>,
}

impl SkipSet {
    /// Build the skip set from every path already in `store`.
    #[must_use]
    pub fn from_store(store: &ClassificationStore) -> Self {
        Self {
            names: store.file_names(),
        }
    }

    /// Whether `name` was already hashed by a previous run.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Store and skip set reconstructed from a previous run's documents.
#[derive(Debug, Clone, Default)]
pub struct ResumeState {
    /// Merged duplicates and uniques
    pub store: ClassificationStore,
    /// Names to leave out of enumeration
    pub skip: SkipSet,
}

impl ResumeState {
    /// Wrap a store, deriving its skip set.
    #[must_use]
    pub fn new(store: ClassificationStore) -> Self {
        let skip = SkipSet::from_store(&store);
        Self { store, skip }
    }
}
