//! Reconciliation planning: diff a local and a remote snapshot.

use crate::tree::snapshot::TreeSnapshot;
use crate::types::BlobHash;
use serde::Serialize;
use std::collections::BTreeSet;

/// A file to fetch and write
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DownloadTask {
    pub path: String,
    pub remote_hash: BlobHash,
}

/// Operations that turn the local tree into the remote tree.
///
/// `to_delete` and the download paths are disjoint: a deleted path is absent remotely, a
/// downloaded path is present remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub to_delete: BTreeSet<String>,
    pub to_download: Vec<DownloadTask>,
    /// Paths present on both sides with equal hashes
    pub unchanged: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_download.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.to_delete.len() + self.to_download.len()
    }

    pub fn download_paths(&self) -> BTreeSet<&str> {
        self.to_download.iter().map(|t| t.path.as_str()).collect()
    }
}

/// Compute the plan that makes `local` equal to `remote`.
pub fn plan(local: &TreeSnapshot, remote: &TreeSnapshot) -> SyncPlan {
    let to_delete = local
        .keys()
        .filter(|key| !remote.contains(key))
        .map(str::to_string)
        .collect();

    let mut to_download = Vec::new();
    let mut unchanged = 0;
    for (key, remote_hash) in remote.iter() {
        match local.get(key) {
            Some(local_hash) if local_hash == remote_hash => unchanged += 1,
            _ => to_download.push(DownloadTask {
                path: key.to_string(),
                remote_hash: remote_hash.clone(),
            }),
        }
    }

    SyncPlan {
        to_delete,
        to_download,
        unchanged,
    }
}
