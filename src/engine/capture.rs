//! Snapshot capture
//!
//! Produces one artifact per configured source. The database dump is
//! streamed through gzip into a temp file and renamed into place, so a
//! crash mid-dump never leaves a half-written artifact under a final
//! name. The volume archive is produced by a throwaway helper container
//! that mounts the volume read-only and the snapshot directory
//! read-write, then exits.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use super::pipeline::BackupConfig;
use crate::error::{SnapError, SnapResult};
use crate::exec::{CommandRunner, CommandSpec};
use crate::models::{Snapshot, SnapshotKind};

/// Captures snapshots for one backup run
pub struct SnapshotCapture<'a, R: CommandRunner> {
    config: &'a BackupConfig,
    runner: &'a R,
}

impl<'a, R: CommandRunner> SnapshotCapture<'a, R> {
    pub fn new(config: &'a BackupConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Dump the database, gzip the stream, and write the artifact
    pub fn capture_database(&self, timestamp_token: &str) -> SnapResult<Snapshot> {
        let kind = SnapshotKind::Database;
        let target = self.fresh_target(kind, timestamp_token)?;
        let temp = temp_path(&target);

        let db = &self.config.database;
        let spec = CommandSpec::new(&self.config.runtime).args([
            "exec",
            db.container.as_str(),
            "pg_dump",
            "-U",
            db.user.as_str(),
            db.name.as_str(),
        ]);

        let file = File::create(&temp)
            .map_err(|e| SnapError::capture(kind, format!("Failed to create {}: {}", temp.display(), e)))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

        let output = self.runner.run_streamed(&spec, &mut encoder).map_err(|e| {
            let _ = fs::remove_file(&temp);
            SnapError::capture(kind, e.to_string())
        })?;

        if !output.success() {
            let _ = fs::remove_file(&temp);
            return Err(SnapError::capture(
                kind,
                command_failure(&spec, &output.stderr_text(), output.status_code),
            ));
        }

        let mut writer = encoder
            .finish()
            .map_err(|e| SnapError::capture(kind, format!("Failed to finish gzip stream: {}", e)))?;
        writer
            .flush()
            .map_err(|e| SnapError::capture(kind, format!("Failed to flush {}: {}", temp.display(), e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| SnapError::capture(kind, format!("Failed to sync {}: {}", temp.display(), e)))?;

        // Atomic rename: the final name only ever holds a complete dump
        fs::rename(&temp, &target).map_err(|e| {
            let _ = fs::remove_file(&temp);
            SnapError::capture(kind, format!("Failed to rename temp file: {}", e))
        })?;

        self.finished_snapshot(kind, &target)
    }

    /// Archive the persistent volume through a throwaway helper context
    pub fn capture_volume(&self, timestamp_token: &str) -> SnapResult<Snapshot> {
        let kind = SnapshotKind::Volume;
        let target = self.fresh_target(kind, timestamp_token)?;
        let filename = kind.filename(timestamp_token);

        // The helper sees the volume read-only and writes the tarball
        // straight into the bind-mounted snapshot directory.
        let mount_dir = fs::canonicalize(&self.config.snapshot_dir)
            .unwrap_or_else(|_| self.config.snapshot_dir.clone());

        let spec = CommandSpec::new(&self.config.runtime).args([
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:/source:ro", self.config.volume.name),
            "-v".to_string(),
            format!("{}:/backup", mount_dir.display()),
            self.config.helper_image.clone(),
            "tar".to_string(),
            "czf".to_string(),
            format!("/backup/{}", filename),
            "-C".to_string(),
            "/source".to_string(),
            ".".to_string(),
        ]);

        let output = self
            .runner
            .run(&spec)
            .map_err(|e| SnapError::capture(kind, e.to_string()))?;

        if !output.success() {
            // A partial tarball stays on disk for manual inspection
            return Err(SnapError::capture(
                kind,
                command_failure(&spec, &output.stderr_text(), output.status_code),
            ));
        }

        if !target.exists() {
            return Err(SnapError::capture(
                kind,
                format!("Helper exited successfully but {} is missing", target.display()),
            ));
        }

        self.finished_snapshot(kind, &target)
    }

    /// Copy the configured file verbatim, if one is configured
    pub fn capture_config(&self, timestamp_token: &str) -> SnapResult<Option<Snapshot>> {
        let kind = SnapshotKind::Config;
        let source = match &self.config.config_file {
            Some(path) => path,
            None => return Ok(None),
        };

        if !source.exists() {
            return Err(SnapError::capture(
                kind,
                format!("Config file not found: {}", source.display()),
            ));
        }

        let target = self.fresh_target(kind, timestamp_token)?;
        let temp = temp_path(&target);

        fs::copy(source, &temp).map_err(|e| {
            SnapError::capture(kind, format!("Failed to copy {}: {}", source.display(), e))
        })?;

        fs::rename(&temp, &target).map_err(|e| {
            let _ = fs::remove_file(&temp);
            SnapError::capture(kind, format!("Failed to rename temp file: {}", e))
        })?;

        self.finished_snapshot(kind, &target).map(Some)
    }

    /// Resolve the target path, refusing to overwrite an existing artifact
    fn fresh_target(&self, kind: SnapshotKind, timestamp_token: &str) -> SnapResult<PathBuf> {
        let target = self.config.snapshot_dir.join(kind.filename(timestamp_token));
        if target.exists() {
            return Err(SnapError::capture(
                kind,
                format!("{} already exists; refusing to overwrite", target.display()),
            ));
        }
        Ok(target)
    }

    fn finished_snapshot(&self, kind: SnapshotKind, target: &Path) -> SnapResult<Snapshot> {
        Snapshot::from_path(kind, target).ok_or_else(|| {
            SnapError::capture(
                kind,
                format!("Artifact {} has an unexpected name", target.display()),
            )
        })
    }
}

/// Temp-file sibling of a target path (`<name>.tmp`)
fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Render a failed invocation for the capture error
fn command_failure(spec: &CommandSpec, stderr: &str, status_code: Option<i32>) -> String {
    let status = status_code
        .map(|c| format!("status {}", c))
        .unwrap_or_else(|| "a signal".to_string());

    if stderr.is_empty() {
        format!("'{}' exited with {}", spec.display(), status)
    } else {
        format!("'{}' exited with {}: {}", spec.display(), status, stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{DatabaseSource, VolumeSource};
    use crate::exec::fake::{FakeResponse, FakeRunner};
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    const TOKEN: &str = "20240108_000000";

    fn test_config(snapshot_dir: PathBuf) -> BackupConfig {
        BackupConfig {
            snapshot_dir,
            runtime: "docker".to_string(),
            database: DatabaseSource {
                container: "stack-db".to_string(),
                name: "workflows".to_string(),
                user: "app".to_string(),
            },
            volume: VolumeSource {
                name: "stack-data".to_string(),
            },
            config_file: None,
            retain_count: 7,
            helper_image: "alpine".to_string(),
        }
    }

    #[test]
    fn test_capture_database_writes_gzipped_dump() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());
        let runner = FakeRunner::new();
        runner.push_response(FakeResponse::ok_with_stdout("CREATE TABLE runs;"));

        let capture = SnapshotCapture::new(&config, &runner);
        let snapshot = capture.capture_database(TOKEN).unwrap();

        assert_eq!(snapshot.filename, "database_20240108_000000.sql.gz");
        assert!(snapshot.path.exists());
        assert!(snapshot.size_bytes > 0);

        // The artifact decompresses back to the dump bytes
        let mut decoder = GzDecoder::new(File::open(&snapshot.path).unwrap());
        let mut dump = String::new();
        decoder.read_to_string(&mut dump).unwrap();
        assert_eq!(dump, "CREATE TABLE runs;");

        // The dump command targets the configured container and database
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "docker");
        assert_eq!(
            calls[0].args,
            vec!["exec", "stack-db", "pg_dump", "-U", "app", "workflows"]
        );
    }

    #[test]
    fn test_capture_database_failure_removes_temp() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());
        let runner = FakeRunner::new();
        runner.push_response(FakeResponse::failed(1, "connection refused"));

        let capture = SnapshotCapture::new(&config, &runner);
        let err = capture.capture_database(TOKEN).unwrap_err();

        assert!(err.is_capture_failed());
        assert!(err.to_string().contains("connection refused"));

        // Neither the final name nor the temp file is left behind
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
    }

    #[test]
    fn test_capture_database_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());
        std::fs::write(
            temp_dir.path().join("database_20240108_000000.sql.gz"),
            b"old",
        )
        .unwrap();

        let runner = FakeRunner::new();
        let capture = SnapshotCapture::new(&config, &runner);
        let err = capture.capture_database(TOKEN).unwrap_err();

        assert!(err.to_string().contains("refusing to overwrite"));
        // The existing artifact is untouched and no command ran
        assert!(runner.calls().is_empty());
        assert_eq!(
            std::fs::read(temp_dir.path().join("database_20240108_000000.sql.gz")).unwrap(),
            b"old"
        );
    }

    #[test]
    fn test_capture_volume_invokes_throwaway_helper() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());
        let target = temp_dir.path().join("volume_20240108_000000.tar.gz");

        let runner = FakeRunner::new();
        runner.push_response(FakeResponse::ok_creating_file(target.clone(), "tarball"));

        let capture = SnapshotCapture::new(&config, &runner);
        let snapshot = capture.capture_volume(TOKEN).unwrap();

        assert_eq!(snapshot.filename, "volume_20240108_000000.tar.gz");
        assert!(snapshot.path.exists());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "docker");
        assert_eq!(calls[0].args[0], "run");
        assert_eq!(calls[0].args[1], "--rm");
        assert!(calls[0].args.contains(&"stack-data:/source:ro".to_string()));
        assert!(calls[0]
            .args
            .contains(&"/backup/volume_20240108_000000.tar.gz".to_string()));
        assert!(calls[0].args.contains(&"alpine".to_string()));
    }

    #[test]
    fn test_capture_volume_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());

        let runner = FakeRunner::new();
        runner.push_response(FakeResponse::failed(2, "no such volume"));

        let capture = SnapshotCapture::new(&config, &runner);
        let err = capture.capture_volume(TOKEN).unwrap_err();

        assert!(err.is_capture_failed());
        assert!(err.to_string().contains("no such volume"));
    }

    #[test]
    fn test_capture_volume_missing_artifact_is_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());

        // Helper exits zero but never writes the tarball
        let runner = FakeRunner::new();
        runner.push_response(FakeResponse::ok());

        let capture = SnapshotCapture::new(&config, &runner);
        let err = capture.capture_volume(TOKEN).unwrap_err();

        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_capture_config_copies_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("stack.env");
        std::fs::write(&source, "KEY=value\n").unwrap();

        let mut config = test_config(temp_dir.path().to_path_buf());
        config.config_file = Some(source);

        let runner = FakeRunner::new();
        let capture = SnapshotCapture::new(&config, &runner);
        let snapshot = capture.capture_config(TOKEN).unwrap().unwrap();

        assert_eq!(snapshot.filename, "config_20240108_000000.backup");
        assert_eq!(std::fs::read(&snapshot.path).unwrap(), b"KEY=value\n");
        // No external command involved in a file copy
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_capture_config_skipped_when_unconfigured() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path().to_path_buf());

        let runner = FakeRunner::new();
        let capture = SnapshotCapture::new(&config, &runner);

        assert!(capture.capture_config(TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_capture_config_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path().to_path_buf());
        config.config_file = Some(temp_dir.path().join("gone.env"));

        let runner = FakeRunner::new();
        let capture = SnapshotCapture::new(&config, &runner);
        let err = capture.capture_config(TOKEN).unwrap_err();

        assert!(err.is_capture_failed());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_temp_path_appends_tmp() {
        let target = Path::new("/snapshots/database_20240108_000000.sql.gz");
        assert_eq!(
            temp_path(target),
            Path::new("/snapshots/database_20240108_000000.sql.gz.tmp")
        );
    }
}
