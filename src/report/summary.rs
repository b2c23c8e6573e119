//! Run report structures
//!
//! Records what one backup run captured, what retention removed, and
//! how the run ended. Serializes to JSON for the history log and the
//! `--json` output mode.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::retention::{DeletionFailure, RetentionOutcome};
use crate::error::SnapError;
use crate::models::{RunState, Snapshot, SnapshotKind};

/// One captured artifact in a run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Artifact kind
    pub kind: SnapshotKind,
    /// Full path to the artifact
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
}

impl ArtifactRecord {
    /// The artifact's filename
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Structured summary of one backup run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started (UTC)
    pub started_at: DateTime<Utc>,

    /// When the run reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Final (or current) run state
    pub state: RunState,

    /// Artifacts captured by this run, in capture order
    pub artifacts: Vec<ArtifactRecord>,

    /// Snapshots removed by retention enforcement
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<PathBuf>,

    /// Snapshots retention could not remove
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deletion_failures: Vec<DeletionFailure>,

    /// Kind whose capture failed, when the run failed during capture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_kind: Option<SnapshotKind>,

    /// Why the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    /// Start a report for a run beginning now
    pub fn begin(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            state: RunState::Capturing,
            artifacts: Vec::new(),
            deleted: Vec::new(),
            deletion_failures: Vec::new(),
            failed_kind: None,
            error: None,
        }
    }

    /// Record a successfully captured artifact
    pub fn record_artifact(&mut self, snapshot: &Snapshot) {
        self.artifacts.push(ArtifactRecord {
            kind: snapshot.kind,
            path: snapshot.path.clone(),
            size_bytes: snapshot.size_bytes,
        });
    }

    /// All captures succeeded; the run is recording outcomes
    pub fn mark_reporting(&mut self) {
        self.state = RunState::Reporting;
    }

    /// The run is enforcing retention
    pub fn mark_enforcing(&mut self) {
        self.state = RunState::EnforcingRetention;
    }

    /// Finish the run successfully with retention results
    pub fn complete(&mut self, outcome: RetentionOutcome) {
        self.deleted = outcome.deleted;
        self.deletion_failures = outcome.failures;
        self.state = RunState::Done;
        self.finished_at = Some(Utc::now());
    }

    /// Finish the run as failed; retention was skipped
    pub fn fail(&mut self, err: &SnapError) {
        self.state = RunState::Failed;
        self.finished_at = Some(Utc::now());

        if let SnapError::CaptureFailed { kind, cause } = err {
            self.failed_kind = Some(*kind);
            self.error = Some(cause.clone());
        } else {
            self.error = Some(err.to_string());
        }
    }

    /// Whether the run ended in failure
    pub fn is_failed(&self) -> bool {
        self.state == RunState::Failed
    }

    /// Reconstruct the run's error, if it failed
    pub fn run_error(&self) -> Option<SnapError> {
        if !self.is_failed() {
            return None;
        }

        let cause = self
            .error
            .clone()
            .unwrap_or_else(|| "backup run failed".to_string());

        match self.failed_kind {
            Some(kind) => Some(SnapError::CaptureFailed { kind, cause }),
            None => Some(SnapError::Io(cause)),
        }
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> Result<String, SnapError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapError::Json(format!("Failed to serialize run report: {}", e)))
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        match self.state {
            RunState::Failed => {
                let kind = self
                    .failed_kind
                    .map(|k| format!(" ({} capture)", k))
                    .unwrap_or_default();
                format!(
                    "{} {}{}: {}",
                    self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    self.state,
                    kind,
                    self.error.as_deref().unwrap_or("unknown error"),
                )
            }
            _ => format!(
                "{} {}: {} artifact(s), {} deleted, {} delete failure(s)",
                self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                self.state,
                self.artifacts.len(),
                self.deleted.len(),
                self.deletion_failures.len(),
            ),
        }
    }
}
