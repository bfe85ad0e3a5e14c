// EN: src/system/executor.rs

//! Spawning of local tools.

use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

/// Failure to start a local tool.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The OS refused to spawn the process.
    #[error("{0}")]
    Spawn(#[from] std::io::Error),
}

/// A fully validated local tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path, after `UBI_<PROG>` overrides.
    pub program: String,
    /// Arguments, not including the program itself.
    pub args: Vec<String>,
    /// Extra variables set on the child only.
    pub env: Vec<(String, String)>,
}

/// Runs a local tool to completion and reports its exit code.
pub trait CommandRunner {
    /// Blocks until the tool exits and returns its status code.
    fn run(&mut self, spec: &CommandSpec) -> Result<i32, ExecutionError>;
}

/// Spawns real processes wired to the launcher's own terminal.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<i32, ExecutionError> {
        let status = StdCommand::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        // Killed by a signal: no code to forward, report plain failure.
        let code = status.code().unwrap_or(1);
        if code != 0 {
            log::debug!("'{}' exited with code {}", spec.program, code);
        }
        Ok(code)
    }
}
