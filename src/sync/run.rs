//! Sync entry points: snapshot both sides concurrently, plan, then execute.

use crate::concurrency::{WorkerPool, DEFAULT_MAX_CONCURRENT};
use crate::error::SyncError;
use crate::remote::{fetch_remote_snapshot, RemoteClient, RepositoryId};
use crate::sync::executor::PlanExecutor;
use crate::sync::plan::{plan, SyncPlan};
use crate::sync::report::SyncReport;
use crate::tree::Scanner;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Everything one sync invocation needs
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub repository: RepositoryId,
    pub reference: String,
    pub local_root: PathBuf,
    pub max_concurrent: usize,
}

impl SyncRequest {
    pub fn new(
        repository: RepositoryId,
        reference: impl Into<String>,
        local_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            reference: reference.into(),
            local_root: local_root.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }
}

/// A computed plan and the revision it targets
#[derive(Debug, Clone)]
pub struct PreparedSync {
    pub revision: String,
    pub plan: SyncPlan,
}

/// Scan the local root and fetch the remote tree concurrently, then diff them.
///
/// Either snapshot failing fails the whole call; nothing on disk is touched.
#[instrument(
    skip(client, request, pool),
    fields(repo = %request.repository, root = %request.local_root.display())
)]
pub async fn prepare<C: RemoteClient + ?Sized>(
    client: &C,
    request: &SyncRequest,
    pool: &WorkerPool,
) -> Result<PreparedSync, SyncError> {
    let scanner = Scanner::new(request.local_root.clone(), pool.clone());

    let (local, remote) = tokio::try_join!(
        async { scanner.scan().await.map_err(SyncError::from) },
        async {
            fetch_remote_snapshot(client, &request.repository, &request.reference)
                .await
                .map_err(SyncError::from)
        },
    )?;

    let plan = plan(&local, &remote.snapshot);
    info!(
        revision = %remote.revision,
        local_files = local.len(),
        remote_files = remote.snapshot.len(),
        to_delete = plan.to_delete.len(),
        to_download = plan.to_download.len(),
        unchanged = plan.unchanged,
        "Sync plan computed"
    );

    Ok(PreparedSync {
        revision: remote.revision,
        plan,
    })
}

/// Run a full sync.
///
/// Returns a report carrying every operation's outcome; failed operations do not produce an
/// `Err`. Use [`SyncReport::into_result`] to treat any failure as an error.
#[instrument(
    skip(client, request),
    fields(repo = %request.repository, reference = %request.reference)
)]
pub async fn run_sync<C: RemoteClient + ?Sized>(
    client: &C,
    request: &SyncRequest,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let pool = WorkerPool::new(request.max_concurrent);

    let prepared = prepare(client, request, &pool).await?;
    let executor = PlanExecutor::new(client, &request.repository, request.local_root.clone(), pool);
    let outcomes = executor.execute(&prepared.plan).await;

    let report = SyncReport {
        revision: prepared.revision,
        outcomes,
        unchanged: prepared.plan.unchanged,
        started_at,
        finished_at: Utc::now(),
    };

    if report.is_success() {
        info!(operations = report.outcomes.len(), "Sync completed");
    } else {
        warn!(
            failed = report.failed_count(),
            operations = report.outcomes.len(),
            "Sync completed with failures"
        );
    }
    Ok(report)
}
