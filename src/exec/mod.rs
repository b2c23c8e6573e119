//! Command execution interface
//!
//! The engine reaches every external tool (dump utility, container
//! runtime, archive helper) through the `CommandRunner` trait, so it
//! never cares whether a tool runs in a container, a VM, or bare metal.
//! Tests substitute a scripted fake; production uses `SystemRunner`.

pub mod runner;

#[cfg(test)]
pub(crate) mod fake;

pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
