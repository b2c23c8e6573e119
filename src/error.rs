//! Custom error types for stacksnap
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::SnapshotKind;

/// The main error type for stacksnap operations
#[derive(Error, Debug)]
pub enum SnapError {
    /// Configuration-related errors (file unreadable, unparsable)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required configuration field is missing or malformed
    #[error("Invalid configuration field '{field}': {reason}")]
    ConfigInvalid { field: &'static str, reason: String },

    /// A capture step failed; the run aborts before retention
    #[error("Capture of {kind} snapshot failed: {cause}")]
    CaptureFailed { kind: SnapshotKind, cause: String },

    /// Another run holds the advisory lock on the backup directory
    #[error("Backup run already in progress: {0}")]
    LockConflict(String),

    /// Retention could not remove a stale snapshot (non-fatal, collected)
    #[error("Failed to delete {path}: {cause}")]
    DeletionFailed { path: String, cause: String },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl SnapError {
    /// Create a capture failure for a kind
    pub fn capture(kind: SnapshotKind, cause: impl Into<String>) -> Self {
        Self::CaptureFailed {
            kind,
            cause: cause.into(),
        }
    }

    /// Create an invalid-configuration error for a field
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field,
            reason: reason.into(),
        }
    }

    /// Create a "not found" error for snapshots
    pub fn snapshot_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Snapshot",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a capture failure
    pub fn is_capture_failed(&self) -> bool {
        matches!(self, Self::CaptureFailed { .. })
    }

    /// Check if this is a lock conflict
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, Self::LockConflict(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SnapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SnapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for stacksnap operations
pub type SnapResult<T> = Result<T, SnapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_capture_failed_error() {
        let err = SnapError::capture(SnapshotKind::Database, "pg_dump exited with 1");
        assert_eq!(
            err.to_string(),
            "Capture of database snapshot failed: pg_dump exited with 1"
        );
        assert!(err.is_capture_failed());
    }

    #[test]
    fn test_config_invalid_error() {
        let err = SnapError::invalid_config("database.name", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration field 'database.name': must not be empty"
        );
    }

    #[test]
    fn test_lock_conflict_error() {
        let err = SnapError::LockConflict("pid 1234".into());
        assert!(err.is_lock_conflict());
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let snap_err: SnapError = io_err.into();
        assert!(matches!(snap_err, SnapError::Io(_)));
    }
}
