//! Local tree scanning: walk the sync root and hash every regular file

use crate::concurrency::WorkerPool;
use crate::error::ScanError;
use crate::tree::hasher;
use crate::tree::path;
use crate::tree::snapshot::{SnapshotBuilder, TreeSnapshot};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument, trace};
use walkdir::WalkDir;

/// A regular file found under the root
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Snapshot key
    pub key: String,
    pub size: u64,
}

/// Synchronous directory walker. Lists regular files only; symlinks are not followed and
/// other entry kinds are skipped.
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn walk(&self) -> Result<Vec<FileEntry>, ScanError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root).follow_links(false).min_depth(1);
        for entry in walker {
            let entry = entry.map_err(|e| match e.path() {
                Some(path) => ScanError::Walk(format!("{}: {}", path.display(), e)),
                None => ScanError::Walk(e.to_string()),
            })?;

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                trace!(path = %entry.path().display(), "Skipping non-regular entry");
                continue;
            }

            let size = entry
                .metadata()
                .map_err(|e| ScanError::Walk(format!("{}: {}", entry.path().display(), e)))?
                .len();
            let key = path::relative_key(&self.root, entry.path())?;
            entries.push(FileEntry {
                path: entry.into_path(),
                key,
                size,
            });
        }

        Ok(entries)
    }
}

/// Builds a [`TreeSnapshot`] of a local directory.
pub struct Scanner {
    root: PathBuf,
    pool: WorkerPool,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, pool: WorkerPool) -> Self {
        Self {
            root: root.into(),
            pool,
        }
    }

    /// Scan the root. A missing root yields an empty snapshot.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn scan(&self) -> Result<TreeSnapshot, ScanError> {
        let start = Instant::now();

        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Sync root does not exist yet, local snapshot is empty");
                return Ok(TreeSnapshot::empty());
            }
            Err(source) => {
                return Err(ScanError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        }

        let root = self.root.clone();
        let entries = tokio::task::spawn_blocking(move || {
            let root = dunce::canonicalize(&root).map_err(|source| ScanError::Io {
                path: root.clone(),
                source,
            })?;
            Walker::new(root).walk()
        })
        .await??;

        let total_bytes: u64 = entries.iter().map(|e| e.size).sum();
        debug!(file_count = entries.len(), total_bytes, "Walked local tree");

        let mut pending = FuturesUnordered::new();
        for entry in entries {
            let pool = &self.pool;
            pending.push(async move {
                let _permit = pool.acquire().await?;
                let hash = hasher::hash_file(&entry.path).await?;
                Ok::<_, ScanError>((entry.key, hash))
            });
        }

        let mut builder = SnapshotBuilder::new();
        while let Some(result) = pending.next().await {
            let (key, hash) = result?;
            trace!(key = %key, hash = %hash.short(), "Hashed file");
            if builder.insert(key.clone(), hash).is_some() {
                return Err(ScanError::DuplicateKey(key));
            }
        }

        let snapshot = builder.freeze();
        info!(
            file_count = snapshot.len(),
            duration_ms = start.elapsed().as_millis(),
            "Local scan completed"
        );
        Ok(snapshot)
    }
}
