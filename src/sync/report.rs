//! Per-operation outcomes and the aggregated sync report

use crate::error::{SyncError, TaskError};
use chrono::{DateTime, Utc};
use serde_json::json;

/// What an operation did to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Download,
    Delete,
}

impl Action {
    fn past_tense(self) -> &'static str {
        match self {
            Action::Download => "downloaded",
            Action::Delete => "deleted",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Action::Download => "download",
            Action::Delete => "delete",
        }
    }
}

/// Outcome of one delete or download
#[derive(Debug)]
pub struct OperationOutcome {
    pub action: Action,
    pub path: String,
    pub result: Result<(), TaskError>,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// `downloaded <path>` / `deleted <path>`, or a failure line with its cause
    pub fn describe(&self) -> String {
        match &self.result {
            Ok(()) => format!("{} {}", self.action.past_tense(), self.path),
            Err(e) => format!("failed to {} {}: {}", self.action.verb(), self.path, e),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "action": self.action.verb(),
            "path": self.path,
            "ok": self.result.is_ok(),
            "error": self.result.as_ref().err().map(|e| e.to_string()),
        })
    }
}

/// Result of executing a plan
#[derive(Debug)]
pub struct SyncReport {
    pub revision: String,
    pub outcomes: Vec<OperationOutcome>,
    pub unchanged: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(OperationOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn count(&self, action: Action) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.action == action && o.is_success())
            .count()
    }

    /// Successful operation descriptions
    pub fn performed(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(OperationOutcome::describe)
            .collect()
    }

    /// Convert to an error if any operation failed
    pub fn into_result(self) -> Result<SyncReport, SyncError> {
        let failed = self.failed_count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(SyncError::OperationsFailed {
                failed,
                total: self.outcomes.len(),
            })
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "revision": self.revision,
            "success": self.is_success(),
            "downloaded": self.count(Action::Download),
            "deleted": self.count(Action::Delete),
            "failed": self.failed_count(),
            "unchanged": self.unchanged,
            "started_at": self.started_at,
            "finished_at": self.finished_at,
            "operations": self.outcomes.iter().map(OperationOutcome::to_json).collect::<Vec<_>>(),
        })
    }
}
