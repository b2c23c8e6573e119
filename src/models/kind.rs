//! Snapshot kind definitions
//!
//! Each kind of backup artifact owns a filename prefix and suffix.
//! Filenames follow `<prefix>_<YYYYMMDD_HHMMSS><suffix>`, which keeps
//! them lexicographically sortable by creation time within a kind.

use serde::{Deserialize, Serialize};

/// The category of a backup artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// Compressed SQL dump of the stack's database
    Database,
    /// Compressed tarball of the stack's persistent data volume
    Volume,
    /// Verbatim copy of the stack's configuration file
    Config,
}

impl SnapshotKind {
    /// All kinds, in capture order
    pub const ALL: [SnapshotKind; 3] = [
        SnapshotKind::Database,
        SnapshotKind::Volume,
        SnapshotKind::Config,
    ];

    /// Filename prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            SnapshotKind::Database => "database",
            SnapshotKind::Volume => "volume",
            SnapshotKind::Config => "config",
        }
    }

    /// Filename suffix for this kind
    pub fn suffix(&self) -> &'static str {
        match self {
            SnapshotKind::Database => ".sql.gz",
            SnapshotKind::Volume => ".tar.gz",
            SnapshotKind::Config => ".backup",
        }
    }

    /// Build the artifact filename for a timestamp token
    pub fn filename(&self, timestamp_token: &str) -> String {
        format!("{}_{}{}", self.prefix(), timestamp_token, self.suffix())
    }

    /// Extract the timestamp token from a filename of this kind
    ///
    /// Returns `None` if the filename doesn't match this kind's pattern.
    pub fn timestamp_token<'a>(&self, filename: &'a str) -> Option<&'a str> {
        let token = filename
            .strip_prefix(self.prefix())?
            .strip_prefix('_')?
            .strip_suffix(self.suffix())?;
        Some(token)
    }
}

impl std::fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
