//! Run history log
//!
//! Append-only record of past backup runs. The log file uses a
//! line-delimited JSON format (JSONL) where each line is one complete
//! run report, written and flushed immediately after the run.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{SnapError, SnapResult};

use super::summary::RunReport;

/// Handles writing run reports to the history log file
pub struct HistoryLog {
    /// Path to the history log file
    log_path: PathBuf,
}

impl HistoryLog {
    /// Create a new HistoryLog that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append a run report
    ///
    /// The report is written as a single JSON line and flushed
    /// immediately so a crash right after a run loses nothing.
    pub fn append(&self, report: &RunReport) -> SnapResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| SnapError::Io(format!("Failed to open history log: {}", e)))?;

        let json = serde_json::to_string(report)
            .map_err(|e| SnapError::Json(format!("Failed to serialize run report: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| SnapError::Io(format!("Failed to write history entry: {}", e)))?;

        file.flush()
            .map_err(|e| SnapError::Io(format!("Failed to flush history log: {}", e)))?;

        Ok(())
    }

    /// Read all run reports from the log file
    ///
    /// Returns reports in chronological order (oldest first).
    pub fn read_all(&self) -> SnapResult<Vec<RunReport>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| SnapError::Io(format!("Failed to open history log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut reports = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                SnapError::Io(format!(
                    "Failed to read history log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let report: RunReport = serde_json::from_str(&line).map_err(|e| {
                SnapError::Json(format!(
                    "Failed to parse history entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            reports.push(report);
        }

        Ok(reports)
    }

    /// Read the most recent N reports from the log
    pub fn read_recent(&self, count: usize) -> SnapResult<Vec<RunReport>> {
        let all_reports = self.read_all()?;
        let start = all_reports.len().saturating_sub(count);
        Ok(all_reports[start..].to_vec())
    }

    /// Get the number of runs recorded in the log
    pub fn entry_count(&self) -> SnapResult<usize> {
        Ok(self.read_all()?.len())
    }

    /// Check if the history log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the history log file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::retention::RetentionOutcome;
    use crate::models::RunState;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_log() -> (HistoryLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("history.log");
        let log = HistoryLog::new(log_path);
        (log, temp_dir)
    }

    fn report_for_day(day: u32) -> RunReport {
        let started_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        let mut report = RunReport::begin(started_at);
        report.complete(RetentionOutcome::default());
        report
    }

    #[test]
    fn test_append_and_read() {
        let (log, _temp) = create_test_log();

        log.append(&report_for_day(8)).unwrap();

        let reports = log.read_all().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].state, RunState::Done);
        assert_eq!(reports[0].started_at.to_rfc3339(), "2024-01-08T00:00:00+00:00");
    }

    #[test]
    fn test_multiple_entries_in_order() {
        let (log, _temp) = create_test_log();

        for day in 1..=5 {
            log.append(&report_for_day(day)).unwrap();
        }

        assert_eq!(log.entry_count().unwrap(), 5);

        let reports = log.read_all().unwrap();
        assert_eq!(reports.len(), 5);
        assert!(reports[0].started_at < reports[4].started_at);
    }

    #[test]
    fn test_read_recent() {
        let (log, _temp) = create_test_log();

        for day in 1..=10 {
            log.append(&report_for_day(day)).unwrap();
        }

        let recent = log.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].started_at.to_rfc3339(), "2024-01-08T00:00:00+00:00");
        assert_eq!(recent[2].started_at.to_rfc3339(), "2024-01-10T00:00:00+00:00");
    }

    #[test]
    fn test_empty_log() {
        let (log, _temp) = create_test_log();

        assert!(!log.exists());
        assert_eq!(log.entry_count().unwrap(), 0);
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_failed_run_round_trips() {
        let (log, _temp) = create_test_log();

        let mut report = report_for_day(8);
        report.fail(&crate::error::SnapError::capture(
            crate::models::SnapshotKind::Volume,
            "no such volume",
        ));
        log.append(&report).unwrap();

        let reports = log.read_all().unwrap();
        assert_eq!(reports[0].state, RunState::Failed);
        assert_eq!(reports[0].error.as_deref(), Some("no such volume"));
    }

    #[test]
    fn test_survives_reopen() {
        let (log, temp) = create_test_log();

        log.append(&report_for_day(8)).unwrap();

        // A new log pointing at the same file (simulating restart)
        let log2 = HistoryLog::new(temp.path().join("history.log"));
        assert_eq!(log2.read_all().unwrap().len(), 1);
    }
}
