//! Remote snapshot construction: resolve a ref and turn its tree listing into a snapshot.

use crate::error::RemoteError;
use crate::remote::{normalize_ref, EntryKind, RemoteClient, RepositoryId};
use crate::tree::path;
use crate::tree::snapshot::{SnapshotBuilder, TreeSnapshot};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Remote tree state at a resolved revision
#[derive(Debug, Clone)]
pub struct RemoteSnapshot {
    pub revision: String,
    pub snapshot: TreeSnapshot,
}

/// Resolve `reference` and fetch the complete blob listing of that revision.
///
/// Any failure is returned as-is; a partial listing is never produced.
#[instrument(skip(client, repo), fields(repo = %repo))]
pub async fn fetch_remote_snapshot<C: RemoteClient + ?Sized>(
    client: &C,
    repo: &RepositoryId,
    reference: &str,
) -> Result<RemoteSnapshot, RemoteError> {
    let start = Instant::now();
    let reference = normalize_ref(reference);

    let revision = client.resolve_ref(repo, &reference).await?;
    debug!(reference = %reference, revision = %revision, "Resolved ref");

    let entries = client.get_tree_recursive(repo, &revision).await?;
    let listed = entries.len();

    let mut builder = SnapshotBuilder::new();
    for entry in entries {
        if entry.kind != EntryKind::Blob {
            continue;
        }
        path::validate_key(&entry.path).map_err(RemoteError::InvalidEntryPath)?;
        let key = entry.path;
        if builder.insert(key.clone(), entry.hash).is_some() {
            return Err(RemoteError::InvalidResponse(format!(
                "duplicate path in tree listing: {}",
                key
            )));
        }
    }

    let snapshot = builder.freeze();
    info!(
        revision = %revision,
        listed,
        file_count = snapshot.len(),
        duration_ms = start.elapsed().as_millis(),
        "Remote tree fetched"
    );
    Ok(RemoteSnapshot { revision, snapshot })
}
