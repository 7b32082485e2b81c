//! Reposync: Mirror a Remote Repository Tree
//!
//! Reconciles a local directory with a revision of a remote content-addressed tree. Both
//! sides are reduced to path → git blob hash snapshots; only files whose hashes differ are
//! downloaded, and files absent remotely are deleted.

pub mod cli;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod remote;
pub mod sync;
pub mod tree;
pub mod types;
