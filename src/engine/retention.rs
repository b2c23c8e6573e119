//! Retention enforcement
//!
//! Keeps the K newest snapshots of a kind and deletes the rest. Kinds
//! are trimmed independently. Deletion is best-effort per file:
//! retention is housekeeping, so one stubborn file must not abort the
//! rest of the sweep.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::registry::SnapshotRegistry;
use crate::error::SnapResult;
use crate::models::SnapshotKind;

/// A snapshot that retention could not remove
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionFailure {
    /// Path of the file that survived
    pub path: PathBuf,
    /// Why the delete failed
    pub cause: String,
}

/// What a retention sweep did
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionOutcome {
    /// Snapshots removed, oldest last
    pub deleted: Vec<PathBuf>,
    /// Snapshots that could not be removed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DeletionFailure>,
}

impl RetentionOutcome {
    /// Fold another sweep's results into this one
    pub fn merge(&mut self, other: RetentionOutcome) {
        self.deleted.extend(other.deleted);
        self.failures.extend(other.failures);
    }

    /// Whether every targeted file was removed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Trim one kind's snapshot set to the retain-count
///
/// Keeps the `retain_count` newest snapshots and deletes every older
/// one. A retain-count of zero deletes the whole set. Running twice
/// with no new snapshots is a no-op the second time.
pub fn enforce(
    registry: &SnapshotRegistry,
    kind: SnapshotKind,
    retain_count: u32,
) -> SnapResult<RetentionOutcome> {
    let snapshots = registry.list(kind)?;
    let mut outcome = RetentionOutcome::default();

    for snapshot in snapshots.into_iter().skip(retain_count as usize) {
        match fs::remove_file(&snapshot.path) {
            Ok(()) => outcome.deleted.push(snapshot.path),
            Err(e) => outcome.failures.push(DeletionFailure {
                path: snapshot.path,
                cause: e.to_string(),
            }),
        }
    }

    Ok(outcome)
}
