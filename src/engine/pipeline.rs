//! Backup run pipeline
//!
//! `BackupEngine` owns the validated configuration and a command runner
//! and drives a run through its states: capture every source, record
//! the outcome, then enforce retention per kind. The first capture
//! failure aborts the run before retention, so a broken run never
//! deletes good snapshots.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use super::capture::SnapshotCapture;
use super::lock::RunLock;
use super::registry::SnapshotRegistry;
use super::retention::{self, DeletionFailure, RetentionOutcome};
use crate::config::settings::{DatabaseSource, VolumeSource};
use crate::config::{Settings, SnapPaths};
use crate::error::{SnapError, SnapResult};
use crate::exec::CommandRunner;
use crate::models::{encode_timestamp, SnapshotKind};
use crate::report::RunReport;

/// Resolved, validated configuration for the backup engine
///
/// Built from user settings; everything ambient (env vars, defaults)
/// is resolved before the engine sees it.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory owning all snapshot artifacts
    pub snapshot_dir: PathBuf,
    /// Container runtime used to reach the sources
    pub runtime: String,
    /// Database source
    pub database: DatabaseSource,
    /// Persistent volume source
    pub volume: VolumeSource,
    /// Configuration file to copy per run (optional)
    pub config_file: Option<PathBuf>,
    /// Snapshots to keep per kind
    pub retain_count: u32,
    /// Image for the throwaway volume-archive helper
    pub helper_image: String,
}

impl BackupConfig {
    /// Build a config from settings and resolved paths
    pub fn from_settings(settings: &Settings, paths: &SnapPaths) -> Self {
        Self {
            snapshot_dir: settings.resolve_snapshot_dir(paths),
            runtime: settings.runtime.clone(),
            database: settings.database.clone(),
            volume: settings.volume.clone(),
            config_file: settings.config_file.clone(),
            retain_count: settings.retain_count,
            helper_image: settings.helper_image.clone(),
        }
    }

    /// Validate required fields before any I/O
    ///
    /// Retain-count zero is deliberately legal: it means "keep nothing",
    /// and the unsigned type keeps negatives unrepresentable.
    pub fn validate(&self) -> SnapResult<()> {
        if self.snapshot_dir.as_os_str().is_empty() {
            return Err(SnapError::invalid_config("snapshot_dir", "must not be empty"));
        }
        if self.runtime.trim().is_empty() {
            return Err(SnapError::invalid_config("runtime", "must not be empty"));
        }
        if self.database.container.trim().is_empty() {
            return Err(SnapError::invalid_config(
                "database.container",
                "must not be empty",
            ));
        }
        if self.database.name.trim().is_empty() {
            return Err(SnapError::invalid_config("database.name", "must not be empty"));
        }
        if self.database.user.trim().is_empty() {
            return Err(SnapError::invalid_config("database.user", "must not be empty"));
        }
        if self.volume.name.trim().is_empty() {
            return Err(SnapError::invalid_config("volume.name", "must not be empty"));
        }
        if self.helper_image.trim().is_empty() {
            return Err(SnapError::invalid_config("helper_image", "must not be empty"));
        }
        if let Some(path) = &self.config_file {
            if path.as_os_str().is_empty() {
                return Err(SnapError::invalid_config("config_file", "must not be empty"));
            }
        }
        Ok(())
    }
}

/// Drives backup runs against a validated configuration
pub struct BackupEngine<R: CommandRunner> {
    config: BackupConfig,
    runner: R,
}

impl<R: CommandRunner> BackupEngine<R> {
    /// Create an engine, validating the configuration up front
    pub fn new(config: BackupConfig, runner: R) -> SnapResult<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// The engine's configuration
    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Registry over the engine's snapshot directory
    pub fn registry(&self) -> SnapshotRegistry {
        SnapshotRegistry::new(self.config.snapshot_dir.clone())
    }

    /// Execute one backup run
    ///
    /// Capture failures are recorded in the returned report
    /// (`RunState::Failed`); lock conflicts and directory errors are
    /// returned as errors since no run ever started.
    pub fn execute(&self) -> SnapResult<RunReport> {
        fs::create_dir_all(&self.config.snapshot_dir).map_err(|e| {
            SnapError::Io(format!(
                "Failed to create snapshot directory {}: {}",
                self.config.snapshot_dir.display(),
                e
            ))
        })?;

        let _lock = RunLock::acquire(&self.config.snapshot_dir)?;

        let started_at = Utc::now();
        let timestamp_token = encode_timestamp(started_at);
        let mut report = RunReport::begin(started_at);

        match self.capture_all(&timestamp_token, &mut report) {
            Ok(()) => {
                report.mark_reporting();
                report.mark_enforcing();
                let outcome = self.enforce_retention();
                report.complete(outcome);
            }
            Err(e) => {
                // Artifacts captured before the failure stay on disk
                // and stay in the report; retention is skipped.
                report.fail(&e);
            }
        }

        Ok(report)
    }

    /// Trim every kind's snapshot set to the retain-count
    ///
    /// Kinds are independent; a listing failure for one kind is
    /// collected and the sweep continues.
    pub fn enforce_retention(&self) -> RetentionOutcome {
        let registry = self.registry();
        let mut outcome = RetentionOutcome::default();

        for kind in SnapshotKind::ALL {
            match retention::enforce(&registry, kind, self.config.retain_count) {
                Ok(swept) => outcome.merge(swept),
                Err(e) => outcome.failures.push(DeletionFailure {
                    path: self.config.snapshot_dir.clone(),
                    cause: format!("Failed to sweep {} snapshots: {}", kind, e),
                }),
            }
        }

        outcome
    }

    fn capture_all(&self, timestamp_token: &str, report: &mut RunReport) -> SnapResult<()> {
        let capture = SnapshotCapture::new(&self.config, &self.runner);

        let database = capture.capture_database(timestamp_token)?;
        report.record_artifact(&database);

        let volume = capture.capture_volume(timestamp_token)?;
        report.record_artifact(&volume);

        if let Some(config_copy) = capture.capture_config(timestamp_token)? {
            report.record_artifact(&config_copy);
        }

        Ok(())
    }
}
