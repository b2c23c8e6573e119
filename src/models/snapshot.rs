//! On-disk snapshot artifact model
//!
//! A snapshot is identified by (kind, timestamp). The timestamp is
//! encoded in the filename as a zero-padded `YYYYMMDD_HHMMSS` token,
//! which is the authoritative creation time. Filesystem mtime is never
//! consulted, since copies and transfers can alter it while the
//! filename stays intact.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::SnapshotKind;

/// Filename timestamp format, fixed-width so names sort lexically by time
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Metadata about a snapshot artifact on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Artifact kind
    pub kind: SnapshotKind,
    /// Artifact filename
    pub filename: String,
    /// Full path to the artifact
    pub path: PathBuf,
    /// Creation time parsed from the filename (UTC)
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

impl Snapshot {
    /// Parse a snapshot from a path, for a given kind
    ///
    /// Returns `None` if the filename doesn't match the kind's naming
    /// pattern or the embedded timestamp is invalid.
    pub fn from_path(kind: SnapshotKind, path: &Path) -> Option<Snapshot> {
        let filename = path.file_name()?.to_string_lossy().to_string();
        let token = kind.timestamp_token(&filename)?;
        let created_at = parse_timestamp(token)?;

        let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Some(Snapshot {
            kind,
            filename,
            path: path.to_path_buf(),
            created_at,
            size_bytes,
        })
    }
}

/// Encode a timestamp as a filename token (`YYYYMMDD_HHMMSS`)
pub fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a filename token back into a UTC timestamp
///
/// Returns `None` for tokens that aren't exactly `YYYYMMDD_HHMMSS`.
pub fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    if token.len() != 15 {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(token, TIMESTAMP_FORMAT).ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}
