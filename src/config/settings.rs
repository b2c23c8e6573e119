//! User settings for stacksnap
//!
//! Persists the backup configuration: which container and database to
//! dump, which volume to archive, where snapshots live, and how many
//! to keep per kind.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::SnapPaths;
use crate::error::SnapError;

/// Database source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSource {
    /// Container or service identifier running the database
    pub container: String,
    /// Database name to dump
    pub name: String,
    /// Database user the dump runs as
    pub user: String,
}

impl Default for DatabaseSource {
    fn default() -> Self {
        Self {
            container: String::new(),
            name: String::new(),
            user: "postgres".to_string(),
        }
    }
}

/// Persistent volume source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeSource {
    /// Named persistent volume to archive
    pub name: String,
}

/// User settings for stacksnap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Container runtime used to reach the sources
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Database source
    #[serde(default)]
    pub database: DatabaseSource,

    /// Persistent volume source
    #[serde(default)]
    pub volume: VolumeSource,

    /// Configuration file to copy verbatim into each run (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,

    /// Snapshot directory override; defaults to the data-dir snapshots/
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,

    /// Number of most-recent snapshots to keep per kind
    #[serde(default = "default_retain_count")]
    pub retain_count: u32,

    /// Image used for the throwaway volume-archive helper
    #[serde(default = "default_helper_image")]
    pub helper_image: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_retain_count() -> u32 {
    7
}

fn default_helper_image() -> String {
    "alpine".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            runtime: default_runtime(),
            database: DatabaseSource::default(),
            volume: VolumeSource::default(),
            config_file: None,
            snapshot_dir: None,
            retain_count: default_retain_count(),
            helper_image: default_helper_image(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SnapPaths) -> Result<Self, SnapError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| SnapError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| SnapError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Create default settings
            let settings = Settings::default();
            // Don't save yet - let caller decide when to persist
            Ok(settings)
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SnapPaths) -> Result<(), SnapError> {
        // Ensure the config directory exists
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SnapError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| SnapError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Resolve the snapshot directory, falling back to the data-dir default
    pub fn resolve_snapshot_dir(&self, paths: &SnapPaths) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(|| paths.snapshot_dir())
    }
}
