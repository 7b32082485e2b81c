//! Error types for the repository sync engine.

use crate::types::BlobHash;
use std::path::PathBuf;
use thiserror::Error;

/// Local scan errors. Any of these aborts the sync before a plan is built.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(String),

    #[error("Sync root is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Duplicate snapshot key: {0}")]
    DuplicateKey(String),

    #[error("Worker pool closed")]
    PoolClosed,

    #[error("Scan task failed: {0}")]
    Join(String),
}

/// Remote API errors
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Ref not found: {0}")]
    RefNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Remote tree listing for {0} is truncated")]
    TruncatedTree(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid path in remote tree: {0}")]
    InvalidEntryPath(String),

    #[error("Failed to decode blob {hash}: {message}")]
    Decode { hash: BlobHash, message: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Failure of a single delete or download operation.
///
/// These never abort sibling operations; they are collected into the sync report.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path:?}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Refusing to write through symbolic link {path:?}")]
    SymlinkedParent { path: PathBuf },

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: BlobHash, actual: BlobHash },

    #[error("Worker pool closed")]
    PoolClosed,
}

/// Whole-run errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Local scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{failed} of {total} operations failed")]
    OperationsFailed { failed: usize, total: usize },
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ScanError {
    fn from(err: tokio::task::JoinError) -> Self {
        ScanError::Join(err.to_string())
    }
}
