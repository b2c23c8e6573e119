//! Advisory run lock
//!
//! A lock file in the snapshot directory marks a run in progress. The
//! lock is cooperative: a second run refuses to start while the file
//! exists. The file records the holder's pid and start time so a
//! conflict message tells the operator who to blame.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SnapError, SnapResult};

/// Lock file name inside the snapshot directory
pub const LOCK_FILENAME: &str = ".stacksnap.lock";

/// Holder diagnostics written into the lock file
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    started_at: DateTime<Utc>,
}

/// Guard for an in-progress backup run
///
/// The lock file is removed when the guard drops. A run killed hard
/// enough to skip Drop leaves the file behind; the conflict message
/// carries the stale holder's pid so it can be cleaned up by hand.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Acquire the advisory lock for a snapshot directory
    ///
    /// # Errors
    ///
    /// Returns `LockConflict` if the lock file already exists.
    pub fn acquire(snapshot_dir: &Path) -> SnapResult<RunLock> {
        let path = snapshot_dir.join(LOCK_FILENAME);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let info = LockInfo {
                    pid: std::process::id(),
                    started_at: Utc::now(),
                };
                let json = serde_json::to_string(&info)
                    .map_err(|e| SnapError::Json(format!("Failed to serialize lock info: {}", e)))?;
                writeln!(file, "{}", json)
                    .map_err(|e| SnapError::Io(format!("Failed to write lock file: {}", e)))?;

                Ok(RunLock { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(SnapError::LockConflict(describe_holder(&path)))
            }
            Err(e) => Err(SnapError::Io(format!(
                "Failed to create lock file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Describe the current lock holder for the conflict message
fn describe_holder(path: &Path) -> String {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<LockInfo>(contents.trim()).ok())
        .map(|info| {
            format!(
                "held by pid {} since {} ({})",
                info.pid,
                info.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                path.display()
            )
        })
        .unwrap_or_else(|| format!("lock file {} exists", path.display()))
}
