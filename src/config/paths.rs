//! Path management for stacksnap
//!
//! Provides XDG-compliant path resolution for configuration, snapshots,
//! and the run history log.
//!
//! ## Path Resolution Order
//!
//! 1. `STACKSNAP_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/stacksnap` or `~/.config/stacksnap`
//! 3. Windows: `%APPDATA%\stacksnap`

use std::path::PathBuf;

use crate::error::SnapError;

/// Manages all paths used by stacksnap
#[derive(Debug, Clone)]
pub struct SnapPaths {
    /// Base directory for all stacksnap data
    base_dir: PathBuf,
}

impl SnapPaths {
    /// Create a new SnapPaths instance
    ///
    /// Path resolution:
    /// 1. `STACKSNAP_DATA_DIR` env var (explicit override)
    /// 2. Unix: `$XDG_CONFIG_HOME/stacksnap` or `~/.config/stacksnap`
    /// 3. Windows: `%APPDATA%\stacksnap`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SnapError> {
        let base_dir = if let Ok(custom) = std::env::var("STACKSNAP_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create SnapPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/stacksnap/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config directory (same as base for simplicity)
    pub fn config_dir(&self) -> PathBuf {
        self.base_dir.clone()
    }

    /// Get the default snapshot directory (~/.config/stacksnap/snapshots/)
    ///
    /// The settings file can point the engine at a different directory;
    /// this is only the fallback.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.base_dir.join("snapshots")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the run history log
    pub fn history_log(&self) -> PathBuf {
        self.base_dir.join("history.log")
    }

    /// Ensure all required directories exist
    ///
    /// Creates:
    /// - Base directory (~/.config/stacksnap/)
    /// - Snapshot directory (~/.config/stacksnap/snapshots/)
    pub fn ensure_directories(&self) -> Result<(), SnapError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SnapError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.snapshot_dir())
            .map_err(|e| SnapError::Io(format!("Failed to create snapshot directory: {}", e)))?;

        Ok(())
    }

    /// Check if stacksnap has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, SnapError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .map_err(|_| SnapError::Config("HOME environment variable not set".into()))
        })?;
    Ok(config_base.join("stacksnap"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, SnapError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| SnapError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("stacksnap"))
}
