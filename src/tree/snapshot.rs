//! Path → blob hash snapshots of a tree

use crate::types::BlobHash;
use std::collections::BTreeMap;

/// Mutable snapshot under construction.
///
/// Scanning and fetching fill a builder they own, then freeze it; nothing copies the map
/// while it grows.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entries: BTreeMap<String, BlobHash>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a normalized key, returning the previous hash if the key was already present.
    pub fn insert(&mut self, key: String, hash: BlobHash) -> Option<BlobHash> {
        self.entries.insert(key, hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn freeze(self) -> TreeSnapshot {
        TreeSnapshot {
            entries: self.entries,
        }
    }
}

/// Immutable snapshot of a tree: regular files only, keyed by root-relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    entries: BTreeMap<String, BlobHash>,
}

impl TreeSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&BlobHash> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlobHash)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K, H> FromIterator<(K, H)> for TreeSnapshot
where
    K: Into<String>,
    H: Into<BlobHash>,
{
    fn from_iter<I: IntoIterator<Item = (K, H)>>(iter: I) -> Self {
        let mut builder = SnapshotBuilder::new();
        for (key, hash) in iter {
            builder.insert(key.into(), hash.into());
        }
        builder.freeze()
    }
}
