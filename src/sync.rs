//! Reconciliation of a local directory with a remote revision
//!
//! [`plan::plan`] diffs two snapshots; [`executor::PlanExecutor`] applies the result;
//! [`run::run_sync`] wires both sides together.

pub mod executor;
pub mod plan;
pub mod report;
pub mod run;

pub use executor::PlanExecutor;
pub use plan::{plan, DownloadTask, SyncPlan};
pub use report::{Action, OperationOutcome, SyncReport};
pub use run::{prepare, run_sync, PreparedSync, SyncRequest};
