//! Remote Tree API
//!
//! Abstraction over the hosted repository API that serves refs, recursive tree listings and
//! blob content. The sync engine only depends on [`RemoteClient`]; the GitHub implementation
//! lives in [`github`].

use crate::error::RemoteError;
use crate::types::BlobHash;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod fetcher;
pub mod github;

pub use fetcher::{fetch_remote_snapshot, RemoteSnapshot};
pub use github::GitHubClient;

/// Owner/name pair identifying a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Kind of a tree listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointer
    Commit,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub hash: BlobHash,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, hash: impl Into<BlobHash>) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
            kind: EntryKind::Blob,
        }
    }
}

/// Remote repository client
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Resolve a symbolic ref (e.g. `heads/master`) to a revision id
    async fn resolve_ref(
        &self,
        repo: &RepositoryId,
        reference: &str,
    ) -> Result<String, RemoteError>;

    /// Full recursive listing of a revision's tree. Implementations must fail rather than
    /// return a partial listing.
    async fn get_tree_recursive(
        &self,
        repo: &RepositoryId,
        revision: &str,
    ) -> Result<Vec<TreeEntry>, RemoteError>;

    /// Decoded content of a blob
    async fn get_blob(&self, repo: &RepositoryId, hash: &BlobHash) -> Result<Vec<u8>, RemoteError>;
}

/// Normalize a user-supplied ref to the `heads/…` / `tags/…` form the API expects.
pub fn normalize_ref(reference: &str) -> String {
    let trimmed = reference.trim().trim_matches('/');
    let trimmed = trimmed.strip_prefix("refs/").unwrap_or(trimmed);
    if trimmed.starts_with("heads/") || trimmed.starts_with("tags/") {
        trimmed.to_string()
    } else {
        format!("heads/{}", trimmed)
    }
}
