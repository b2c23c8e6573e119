//! The backup engine
//!
//! Runs the snapshot pipeline for a configured stack: capture database,
//! volume, and config snapshots, then enforce the retention policy per
//! kind. An advisory lock on the snapshot directory keeps concurrent
//! runs from corrupting each other's writes.
//!
//! # Architecture
//!
//! - `capture`: produces one artifact per configured source
//! - `registry`: enumerates snapshots on disk, newest first
//! - `retention`: trims each kind's snapshot set to the retain-count
//! - `lock`: advisory run lock (lock file with holder diagnostics)
//! - `pipeline`: `BackupEngine`, which ties the steps together

pub mod capture;
pub mod lock;
pub mod pipeline;
pub mod registry;
pub mod retention;

pub use capture::SnapshotCapture;
pub use lock::RunLock;
pub use pipeline::{BackupConfig, BackupEngine};
pub use registry::SnapshotRegistry;
pub use retention::{DeletionFailure, RetentionOutcome};
