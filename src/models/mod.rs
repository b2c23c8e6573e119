//! Core data models for stacksnap
//!
//! Defines snapshot kinds, the on-disk snapshot artifact model,
//! filename timestamp encoding, and the backup run state machine.

pub mod kind;
pub mod run;
pub mod snapshot;

pub use kind::SnapshotKind;
pub use run::RunState;
pub use snapshot::{encode_timestamp, parse_timestamp, Snapshot};
