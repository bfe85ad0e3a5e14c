//! Command-line client for the Ubicloud API.
//!
//! The `ubi` binary is a thin launcher: it acquires an execution environment,
//! forwards the process arguments to the hosted [`cli::program::UbiProgram`],
//! and turns the outcome into an exit status.

pub mod cli;
pub mod constants;
pub mod core;
pub mod system;
