//! stacksnap - Snapshot and retention tool for single-node container stacks
//!
//! This library provides the core functionality for stacksnap. It captures
//! point-in-time snapshots of a container stack's database, persistent data
//! volume, and configuration file, and enforces a bounded retention policy
//! over the resulting artifacts.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (snapshot kinds, artifacts, run states)
//! - `exec`: External command execution interface
//! - `engine`: The backup engine (capture, registry, retention, locking)
//! - `report`: Run reports and the history log
//! - `cli`: CLI command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use stacksnap::config::{paths::SnapPaths, settings::Settings};
//! use stacksnap::engine::{BackupConfig, BackupEngine};
//! use stacksnap::exec::SystemRunner;
//!
//! let paths = SnapPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//!
//! let config = BackupConfig::from_settings(&settings, &paths);
//! let engine = BackupEngine::new(config, SystemRunner::new())?;
//! let report = engine.execute()?;
//! println!("{}", report.summary());
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod models;
pub mod report;

pub use error::SnapError;
