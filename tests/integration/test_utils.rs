//! Shared test utilities for integration tests
//!
//! `FakeRemote` serves a fixed revision from memory and records how many blob fetches are
//! in flight at once.

use async_trait::async_trait;
use parking_lot::Mutex;
use reposync::error::RemoteError;
use reposync::remote::{RemoteClient, RepositoryId, TreeEntry};
use reposync::tree::hasher::compute_blob_hash;
use reposync::types::BlobHash;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const REVISION: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

pub struct FakeRemote {
    files: BTreeMap<String, Vec<u8>>,
    blobs: HashMap<BlobHash, Vec<u8>>,
    failing: Mutex<HashSet<BlobHash>>,
    corrupted: HashSet<BlobHash>,
    truncated: bool,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    blob_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(files: &[(&str, &[u8])]) -> Self {
        let files: BTreeMap<String, Vec<u8>> = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.to_vec()))
            .collect();
        let blobs = files
            .values()
            .map(|content| (compute_blob_hash(content), content.clone()))
            .collect();
        Self {
            files,
            blobs,
            failing: Mutex::new(HashSet::new()),
            corrupted: HashSet::new(),
            truncated: false,
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            blob_calls: AtomicUsize::new(0),
        }
    }

    /// Each blob fetch sleeps this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Report the tree listing as truncated
    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    /// Serve wrong bytes for this content's blob
    pub fn corrupt(mut self, content: &[u8]) -> Self {
        self.corrupted.insert(compute_blob_hash(content));
        self
    }

    /// Fail fetches of this content's blob
    pub fn fail_blob(&self, content: &[u8]) {
        self.failing.lock().insert(compute_blob_hash(content));
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn blob_calls(&self) -> usize {
        self.blob_calls.load(Ordering::SeqCst)
    }

    /// Assert the directory under `root` contains exactly the remote files
    pub fn assert_mirrored(&self, root: &Path) {
        let mut found = BTreeMap::new();
        for entry in walkdir::WalkDir::new(root).min_depth(1) {
            let entry = entry.unwrap();
            if entry.file_type().is_file() {
                let key = entry
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                found.insert(key, std::fs::read(entry.path()).unwrap());
            }
        }
        assert_eq!(found, self.files);
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn resolve_ref(
        &self,
        repo: &RepositoryId,
        reference: &str,
    ) -> Result<String, RemoteError> {
        if reference == "heads/master" {
            Ok(REVISION.to_string())
        } else {
            Err(RemoteError::RefNotFound(format!("{} in {}", reference, repo)))
        }
    }

    async fn get_tree_recursive(
        &self,
        _repo: &RepositoryId,
        revision: &str,
    ) -> Result<Vec<TreeEntry>, RemoteError> {
        assert_eq!(revision, REVISION);
        if self.truncated {
            return Err(RemoteError::TruncatedTree(revision.to_string()));
        }
        Ok(self
            .files
            .iter()
            .map(|(path, content)| TreeEntry::blob(path.clone(), compute_blob_hash(content)))
            .collect())
    }

    async fn get_blob(
        &self,
        _repo: &RepositoryId,
        hash: &BlobHash,
    ) -> Result<Vec<u8>, RemoteError> {
        self.blob_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.lock().contains(hash) {
            return Err(RemoteError::RequestFailed(format!("status 502: blob {}", hash)));
        }
        let mut content = self
            .blobs
            .get(hash)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("blob {}", hash)))?;
        if self.corrupted.contains(hash) {
            content.push(b'!');
        }
        Ok(content)
    }
}

pub fn repo() -> RepositoryId {
    RepositoryId::new("TehShrike", "sync-github-to-fs")
}
