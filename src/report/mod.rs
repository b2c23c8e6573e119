//! Run reporting for stacksnap
//!
//! Every backup run produces a structured `RunReport` suitable for
//! human output or JSON emission. Reports are appended to a
//! line-delimited JSON history log so past runs stay inspectable.

pub mod history;
pub mod summary;

pub use history::HistoryLog;
pub use summary::{ArtifactRecord, RunReport};
