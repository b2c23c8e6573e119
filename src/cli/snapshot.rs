//! Snapshot CLI commands
//!
//! Implements the run, list, prune, and history commands.

use crate::config::{Settings, SnapPaths};
use crate::engine::registry::SnapshotRegistry;
use crate::engine::retention::{self, RetentionOutcome};
use crate::engine::{BackupConfig, BackupEngine};
use crate::error::SnapResult;
use crate::exec::SystemRunner;
use crate::models::SnapshotKind;
use crate::report::HistoryLog;

/// Handle `stacksnap run`
pub fn handle_run_command(paths: &SnapPaths, settings: &Settings, json: bool) -> SnapResult<()> {
    paths.ensure_directories()?;

    let config = BackupConfig::from_settings(settings, paths);
    let engine = BackupEngine::new(config, SystemRunner::new())?;

    if !json {
        println!("Starting backup run...");
    }

    let report = engine.execute()?;

    // Record the run before deciding the exit status, so failed runs
    // show up in the history too.
    HistoryLog::new(paths.history_log()).append(&report)?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        for artifact in &report.artifacts {
            println!(
                "  {}: {} ({})",
                artifact.kind,
                artifact.filename(),
                format_size(artifact.size_bytes)
            );
        }
        for path in &report.deleted {
            println!("  pruned: {}", path.display());
        }
        for failure in &report.deletion_failures {
            println!(
                "  WARNING: could not delete {}: {}",
                failure.path.display(),
                failure.cause
            );
        }
        println!("{}", report.summary());
    }

    match report.run_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Handle `stacksnap list`
pub fn handle_list_command(paths: &SnapPaths, settings: &Settings, verbose: bool) -> SnapResult<()> {
    let registry = SnapshotRegistry::new(settings.resolve_snapshot_dir(paths));
    let all = registry.list_all()?;

    let total: usize = all.iter().map(|(_, snapshots)| snapshots.len()).sum();
    if total == 0 {
        println!("No snapshots found.");
        println!("Create one with: stacksnap run");
        return Ok(());
    }

    println!("Available Snapshots");
    println!("===================");
    println!();

    for (kind, snapshots) in &all {
        if snapshots.is_empty() {
            continue;
        }

        println!("{}:", kind);

        for (i, snapshot) in snapshots.iter().enumerate() {
            let age = chrono::Utc::now().signed_duration_since(snapshot.created_at);
            let age_str = format_duration(age);

            if verbose {
                println!(
                    "  {}. {}\n     Created: {}\n     Size: {}\n     Age: {}",
                    i + 1,
                    snapshot.filename,
                    snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    format_size(snapshot.size_bytes),
                    age_str,
                );
            } else {
                println!(
                    "  {}. {} ({} ago, {})",
                    i + 1,
                    snapshot.filename,
                    age_str,
                    format_size(snapshot.size_bytes),
                );
            }
        }

        println!();
    }

    println!("Total: {} snapshot(s)", total);
    Ok(())
}

/// Handle `stacksnap prune`
pub fn handle_prune_command(paths: &SnapPaths, settings: &Settings, force: bool) -> SnapResult<()> {
    let registry = SnapshotRegistry::new(settings.resolve_snapshot_dir(paths));
    let retain_count = settings.retain_count;

    // Count what the sweep would remove before touching anything
    let mut per_kind = Vec::new();
    let mut total_to_delete = 0;
    for (kind, snapshots) in registry.list_all()? {
        let to_delete = snapshots.len().saturating_sub(retain_count as usize);
        total_to_delete += to_delete;
        per_kind.push((kind, snapshots.len(), to_delete));
    }

    if total_to_delete == 0 {
        println!("No snapshots to prune.");
        println!("Current retention policy: keep {} per kind", retain_count);
        return Ok(());
    }

    println!("Prune Summary");
    println!("=============");
    println!("Retention policy: keep {} per kind", retain_count);
    for (kind, have, to_delete) in &per_kind {
        println!("  {}: {} snapshot(s), {} to delete", kind, have, to_delete);
    }
    println!();

    if !force {
        println!("To delete old snapshots, run again with --force flag:");
        println!("  stacksnap prune --force");
        return Ok(());
    }

    let mut outcome = RetentionOutcome::default();
    for kind in SnapshotKind::ALL {
        outcome.merge(retention::enforce(&registry, kind, retain_count)?);
    }

    println!("Deleted {} snapshot(s).", outcome.deleted.len());
    for failure in &outcome.failures {
        println!(
            "WARNING: could not delete {}: {}",
            failure.path.display(),
            failure.cause
        );
    }

    Ok(())
}

/// Handle `stacksnap history`
pub fn handle_history_command(paths: &SnapPaths, count: usize) -> SnapResult<()> {
    let log = HistoryLog::new(paths.history_log());
    let reports = log.read_recent(count)?;

    if reports.is_empty() {
        println!("No backup runs recorded.");
        return Ok(());
    }

    println!("Recent Backup Runs");
    println!("==================");
    println!();

    // Newest last in the log; show newest first
    for report in reports.iter().rev() {
        println!("{}", report.summary());
        for failure in &report.deletion_failures {
            println!("    could not delete {}: {}", failure.path.display(), failure.cause);
        }
    }

    Ok(())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    let months = days / 30;
    format!("{}mo", months)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(30)), "30s");
        assert_eq!(format_duration(chrono::Duration::minutes(5)), "5m");
        assert_eq!(format_duration(chrono::Duration::hours(3)), "3h");
        assert_eq!(format_duration(chrono::Duration::days(2)), "2d");
        assert_eq!(format_duration(chrono::Duration::days(90)), "3mo");
    }
}
