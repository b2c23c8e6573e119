//! Snapshot registry
//!
//! Enumerates snapshots on disk per kind, ordered newest first. The
//! ordering contract is the filename timestamp, never filesystem mtime:
//! copies and transfers can rewrite mtime while the filename stays
//! authoritative.

use std::fs;
use std::path::PathBuf;

use crate::error::{SnapError, SnapResult};
use crate::models::{Snapshot, SnapshotKind};

/// Lists snapshot artifacts in a backup directory
#[derive(Debug, Clone)]
pub struct SnapshotRegistry {
    snapshot_dir: PathBuf,
}

impl SnapshotRegistry {
    /// Create a registry over a snapshot directory
    pub fn new(snapshot_dir: PathBuf) -> Self {
        Self { snapshot_dir }
    }

    /// The directory this registry scans
    pub fn snapshot_dir(&self) -> &PathBuf {
        &self.snapshot_dir
    }

    /// List snapshots of one kind, newest first
    ///
    /// A missing directory yields an empty list. Files that don't match
    /// the kind's naming pattern are ignored.
    pub fn list(&self, kind: SnapshotKind) -> SnapResult<Vec<Snapshot>> {
        if !self.snapshot_dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.snapshot_dir)
            .map_err(|e| SnapError::Io(format!("Failed to read snapshot directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| SnapError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if let Some(snapshot) = Snapshot::from_path(kind, &path) {
                snapshots.push(snapshot);
            }
        }

        // Fixed-width timestamps make the filename sort chronological
        snapshots.sort_by(|a, b| b.filename.cmp(&a.filename));

        Ok(snapshots)
    }

    /// List snapshots of every kind, newest first within each kind
    pub fn list_all(&self) -> SnapResult<Vec<(SnapshotKind, Vec<Snapshot>)>> {
        SnapshotKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, self.list(kind)?)))
            .collect()
    }
}
