//! Configuration module for stacksnap
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence
//! - Validation of the backup configuration before any I/O

pub mod paths;
pub mod settings;

pub use paths::SnapPaths;
pub use settings::Settings;
