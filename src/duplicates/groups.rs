//! Digest-to-paths classification store and its duplicate/unique partition.
//!
//! # Overview
//!
//! [`ClassificationStore`] maps each digest to the paths that produced it,
//! in the order the hashes completed. [`ClassificationStore::partition`]
//! splits it into:
//!
//! - **duplicates**: digests shared by two or more paths, mapped to the
//!   full sequence
//! - **uniques**: digests seen exactly once, mapped to the bare path (not
//!   a one-element sequence)
//!
//! This asymmetric shape is exactly what gets persisted, so
//! [`Partition::into_store`] reverses it when a run is resumed.
//!
//! The store is owned by the coordinating thread only. Workers never touch
//! it, so it needs no locking.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::ClassificationStore;
//!
//! let mut store = ClassificationStore::new();
//! store.record("d1", "/data/a.txt");
//! store.record("d1", "/data/b.txt");
//! store.record("d2", "/data/c.txt");
//!
//! let partition = store.partition();
//! assert_eq!(partition.duplicates["d1"], vec!["/data/a.txt", "/data/b.txt"]);
//! assert_eq!(partition.uniques["d2"], "/data/c.txt");
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Convert a filesystem path into the string form stored in documents.
///
/// Non UTF-8 sequences are replaced, matching what JSON can represent.
#[must_use]
pub fn path_to_record(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// In-memory mapping from digest to the paths sharing it.
#[derive(Debug, Clone, Default)]
pub struct ClassificationStore {
    groups: HashMap<String, Vec<String>>,
    paths: HashSet<String>,
}

impl ClassificationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the sequence for `digest`.
    ///
    /// Returns `false` and leaves the store untouched when `path` is
    /// already recorded (under any digest).
    pub fn record(&mut self, digest: impl Into<String>, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.paths.contains(&path) {
            log::debug!("Ignoring already recorded path: {}", path);
            return false;
        }
        self.paths.insert(path.clone());
        self.groups.entry(digest.into()).or_default().push(path);
        true
    }

    /// Split the store into duplicate and unique groups.
    ///
    /// Keys come back sorted; sequences keep completion order.
    #[must_use]
    pub fn partition(&self) -> Partition {
        let mut partition = Partition::default();
        for (digest, paths) in &self.groups {
            match paths.as_slice() {
                [] => {}
                [only] => {
                    partition.uniques.insert(digest.clone(), only.clone());
                }
                _ => {
                    partition.duplicates.insert(digest.clone(), paths.clone());
                }
            }
        }
        partition
    }

    /// Paths recorded under `digest`, in completion order.
    #[must_use]
    pub fn get(&self, digest: &str) -> Option<&[String]> {
        self.groups.get(digest).map(Vec::as_slice)
    }

    /// Whether `path` has been recorded.
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Base file names of every recorded path.
    #[must_use]
    pub fn file_names(&self) -> HashSet<String> {
        self.paths
            .iter()
            .filter_map(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    /// Number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn digest_count(&self) -> usize {
        self.groups.len()
    }
}

/// Duplicate/unique split of a [`ClassificationStore`].
///
/// This is also the in-memory form of the two persisted documents, which
/// is why the maps are ordered: serializing them yields sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Digest to every path sharing it (two or more)
    pub duplicates: BTreeMap<String, Vec<String>>,
    /// Digest to its only path
    pub uniques: BTreeMap<String, String>,
}

impl Partition {
    /// Rebuild a store from a partition.
    ///
    /// Unique paths become one-element sequences. Documents that disagree
    /// (the same digest in both maps) are merged as a union, and a path is
    /// kept under the first digest it appears with.
    #[must_use]
    pub fn into_store(self) -> ClassificationStore {
        let mut store = ClassificationStore::new();
        for (digest, paths) in self.duplicates {
            for path in paths {
                store.record(digest.clone(), path);
            }
        }
        for (digest, path) in self.uniques {
            store.record(digest, path);
        }
        store
    }

    /// Number of digests with more than one path.
    #[must_use]
    pub fn duplicate_groups(&self) -> usize {
        self.duplicates.len()
    }

    /// Number of paths inside duplicate groups.
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.duplicates.values().map(Vec::len).sum()
    }

    /// Number of paths with unique content.
    #[must_use]
    pub fn unique_files(&self) -> usize {
        self.uniques.len()
    }

    /// Every classified path.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.duplicate_files() + self.unique_files()
    }

    /// Whether both groups are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.uniques.is_empty()
    }

    /// Copy with every duplicate sequence sorted.
    ///
    /// Sequence order reflects hash completion order, which varies between
    /// runs; compare canonical forms when only membership matters.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let mut canonical = self.clone();
        for paths in canonical.duplicates.values_mut() {
            paths.sort();
        }
        canonical
    }
}
