//! Bounded worker pool shared by scanning and plan execution.
//!
//! One pool is created per sync invocation and handed to every stage that fans out I/O,
//! so a single `max_concurrent` setting bounds file hashing, deletions, and blob fetches.

use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Default number of concurrent operations
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Returned when the pool's semaphore has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolClosed;

impl From<PoolClosed> for crate::error::ScanError {
    fn from(_: PoolClosed) -> Self {
        crate::error::ScanError::PoolClosed
    }
}

impl From<PoolClosed> for crate::error::TaskError {
    fn from(_: PoolClosed) -> Self {
        crate::error::TaskError::PoolClosed
    }
}

/// Invocation-owned concurrency limiter.
///
/// Cloning shares the same slots.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` slots. A size of zero is raised to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.size - self.semaphore.available_permits()
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, PoolClosed> {
        self.semaphore.acquire().await.map_err(|_| PoolClosed)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}
