//! Plan executor: applies a sync plan to the local tree.
//! Deletions run first, then empty directories they leave behind are pruned and symlinks in the
//! way of download directories are unlinked, then downloads.
//! Every operation holds a worker pool slot; per-operation failures are collected, never fatal.

use crate::concurrency::WorkerPool;
use crate::error::TaskError;
use crate::remote::{RemoteClient, RepositoryId};
use crate::sync::plan::{DownloadTask, SyncPlan};
use crate::sync::report::{Action, OperationOutcome};
use crate::tree::{hasher, path};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, instrument, trace, warn};

/// Executes sync plans against one local root and one remote repository.
pub struct PlanExecutor<'a, C: RemoteClient + ?Sized> {
    client: &'a C,
    repo: &'a RepositoryId,
    root: PathBuf,
    pool: WorkerPool,
}

impl<'a, C: RemoteClient + ?Sized> PlanExecutor<'a, C> {
    pub fn new(
        client: &'a C,
        repo: &'a RepositoryId,
        root: impl Into<PathBuf>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            client,
            repo,
            root: root.into(),
            pool,
        }
    }

    /// Apply `plan`, returning one outcome per operation.
    #[instrument(skip(self, plan), fields(
        root = %self.root.display(),
        deletes = plan.to_delete.len(),
        downloads = plan.to_download.len(),
    ))]
    pub async fn execute(&self, plan: &SyncPlan) -> Vec<OperationOutcome> {
        let mut outcomes = Vec::with_capacity(plan.operation_count());

        let mut deletions = FuturesUnordered::new();
        for key in &plan.to_delete {
            deletions.push(async move {
                let result = self.delete(key).await;
                OperationOutcome {
                    action: Action::Delete,
                    path: key.clone(),
                    result,
                }
            });
        }
        while let Some(outcome) = deletions.next().await {
            record(&outcome);
            outcomes.push(outcome);
        }
        drop(deletions);

        self.prune_empty_dirs(plan.to_delete.iter().map(String::as_str))
            .await;
        self.unlink_symlinked_dirs(plan.to_download.iter().map(|t| t.path.as_str()))
            .await;

        let mut downloads = FuturesUnordered::new();
        for task in &plan.to_download {
            downloads.push(async move {
                let result = self.download(task).await;
                OperationOutcome {
                    action: Action::Download,
                    path: task.path.clone(),
                    result,
                }
            });
        }
        while let Some(outcome) = downloads.next().await {
            record(&outcome);
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn delete(&self, key: &str) -> Result<(), TaskError> {
        let _permit = self.pool.acquire().await?;
        let target = path::local_path(&self.root, key);
        tokio::fs::remove_file(&target)
            .await
            .map_err(|source| TaskError::Delete {
                path: target,
                source,
            })
    }

    /// Remove directories emptied by deletions, deepest first. The root is never removed.
    async fn prune_empty_dirs<'k>(&self, deleted: impl Iterator<Item = &'k str>) {
        let mut dirs: BTreeSet<(usize, &str)> = BTreeSet::new();
        for key in deleted {
            for dir in path::ancestors(key) {
                dirs.insert((dir.matches('/').count(), dir));
            }
        }

        for (_, dir) in dirs.into_iter().rev() {
            let target = path::local_path(&self.root, dir);
            // Non-empty directories are expected to fail here.
            if tokio::fs::remove_dir(&target).await.is_ok() {
                trace!(dir, "Pruned empty directory");
            }
        }
    }

    /// Replace symlinks that sit where a download needs a directory. The scan never follows
    /// links, so they are not part of the local snapshot and would otherwise redirect writes
    /// outside the root.
    async fn unlink_symlinked_dirs<'k>(&self, downloads: impl Iterator<Item = &'k str>) {
        let mut dirs: BTreeSet<(usize, &str)> = BTreeSet::new();
        for key in downloads {
            for dir in path::ancestors(key) {
                dirs.insert((dir.matches('/').count(), dir));
            }
        }

        for (_, dir) in dirs {
            let target = path::local_path(&self.root, dir);
            match tokio::fs::symlink_metadata(&target).await {
                Ok(meta) if meta.file_type().is_symlink() => {}
                _ => continue,
            }
            let removed = match tokio::fs::remove_file(&target).await {
                Ok(()) => Ok(()),
                // Directory symlinks on Windows
                Err(_) => tokio::fs::remove_dir(&target).await,
            };
            match removed {
                Ok(()) => debug!(dir, "Removed symlink in place of directory"),
                Err(e) => warn!(
                    dir,
                    error = %e,
                    "Failed to remove symlink in place of directory"
                ),
            }
        }
    }

    /// Fail if any existing ancestor of `key` below the root is a symlink.
    async fn check_parents(&self, key: &str) -> Result<(), TaskError> {
        let mut dirs: Vec<&str> = path::ancestors(key).collect();
        dirs.reverse();
        for dir in dirs {
            let target = path::local_path(&self.root, dir);
            match tokio::fs::symlink_metadata(&target).await {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(TaskError::SymlinkedParent { path: target });
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => break,
                Err(source) => {
                    return Err(TaskError::CreateDir {
                        path: target,
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    async fn download(&self, task: &DownloadTask) -> Result<(), TaskError> {
        let _permit = self.pool.acquire().await?;

        let content = self.client.get_blob(self.repo, &task.remote_hash).await?;
        let actual = hasher::compute_blob_hash(&content);
        if actual != task.remote_hash {
            return Err(TaskError::HashMismatch {
                expected: task.remote_hash.clone(),
                actual,
            });
        }

        self.check_parents(&task.path).await?;
        let target = path::local_path(&self.root, &task.path);
        if let Some(parent) = target.parent() {
            // create_dir_all tolerates concurrent creation of shared ancestors
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TaskError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let bytes = content.len();
        write_replacing(target, content).await?;
        debug!(path = %task.path, bytes, "Wrote file");
        Ok(())
    }
}

fn record(outcome: &OperationOutcome) {
    match &outcome.result {
        Ok(()) => debug!("{}", outcome.describe()),
        Err(e) => warn!(path = %outcome.path, error = %e, "Operation failed"),
    }
}

/// Write `content` to a uniquely named temp file next to `target`, then rename it into
/// place. The temp file is removed if anything fails before the rename.
async fn write_replacing(target: PathBuf, content: Vec<u8>) -> Result<(), TaskError> {
    let path = target.clone();
    let written = tokio::task::spawn_blocking(move || -> io::Result<()> {
        let parent = target.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "target has no parent directory")
        })?;
        let mut temp = tempfile::Builder::new()
            .prefix(".reposync-")
            .tempfile_in(parent)?;
        temp.write_all(&content)?;
        temp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await;

    match written {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(TaskError::Write { path, source }),
        Err(join) => Err(TaskError::Write {
            path,
            source: io::Error::new(io::ErrorKind::Other, join),
        }),
    }
}
