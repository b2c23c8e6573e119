//! Backup run state machine
//!
//! A run moves `Capturing -> Reporting -> EnforcingRetention -> Done`.
//! Any capture failure transitions directly to `Failed`, skipping
//! retention so a broken run never deletes good snapshots.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Capturing snapshots from configured sources
    Capturing,
    /// All captures succeeded; recording artifact outcomes
    Reporting,
    /// Trimming each kind's snapshot set to the retain-count
    EnforcingRetention,
    /// Run completed; retention enforced
    Done,
    /// A capture failed; retention was skipped (terminal)
    Failed,
}

impl RunState {
    /// Whether this state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Capturing => write!(f, "CAPTURING"),
            RunState::Reporting => write!(f, "REPORTING"),
            RunState::EnforcingRetention => write!(f, "ENFORCING_RETENTION"),
            RunState::Done => write!(f, "DONE"),
            RunState::Failed => write!(f, "FAILED"),
        }
    }
}
