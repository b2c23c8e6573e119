//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup engine.

pub mod snapshot;

pub use snapshot::{
    handle_history_command, handle_list_command, handle_prune_command, handle_run_command,
};
