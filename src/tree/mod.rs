//! Tree snapshots
//!
//! A tree is represented as a flat map from root-relative path to blob hash. The local side
//! is produced by walking and hashing the filesystem; the remote side uses the same key and
//! hash conventions so the two compare directly.

pub mod hasher;
pub mod path;
pub mod snapshot;
pub mod walker;

pub use snapshot::{SnapshotBuilder, TreeSnapshot};
pub use walker::Scanner;
