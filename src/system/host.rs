// src/system/host.rs

//! The concrete execution environment used by the `ubi` binary.

use crate::core::config::UbiConfig;
use crate::core::error::{LaunchError, ProgramError};
use crate::core::launcher::{Environment, Runtime};
use crate::system::executor::{CommandRunner, SystemRunner};
use crate::system::transport::{Transport, UreqTransport};
use std::fmt;
use std::io::{self, BufRead, Write};

/// Standard streams as seen by a program.
pub struct HostIo {
    /// Read for the confirmation answer.
    pub stdin: Box<dyn BufRead>,
    /// Receives successful response bodies.
    pub stdout: Box<dyn Write>,
    /// Receives error bodies and diagnostics.
    pub stderr: Box<dyn Write>,
}

impl HostIo {
    /// The process's own stdio.
    pub fn inherit() -> Self {
        Self {
            stdin: Box::new(io::BufReader::new(io::stdin())),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }
}

impl fmt::Debug for HostIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostIo").finish_non_exhaustive()
    }
}

/// Everything a program run owns: configuration, stdio, the API transport,
/// the local command runner, and the unhandled-error slot.
pub struct HostEnv {
    /// Settings captured at startup.
    pub config: UbiConfig,
    /// Standard streams.
    pub io: HostIo,
    /// Talks to the API.
    pub transport: Box<dyn Transport>,
    /// Starts local tools.
    pub runner: Box<dyn CommandRunner>,
    error: Option<ProgramError>,
}

impl HostEnv {
    /// An environment with an empty error slot.
    pub fn new(
        config: UbiConfig,
        io: HostIo,
        transport: Box<dyn Transport>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            io,
            transport,
            runner,
            error: None,
        }
    }
}

impl fmt::Debug for HostEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEnv")
            .field("config", &self.config)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Environment for HostEnv {
    fn raise(&mut self, error: ProgramError) {
        if let Some(previous) = &self.error {
            log::debug!("replacing unhandled error '{}' with '{}'", previous, error);
        }
        self.error = Some(error);
    }

    fn unhandled_error(&self) -> Option<&ProgramError> {
        self.error.as_ref()
    }

    fn close(mut self) {
        // Flush whatever the program left buffered before the streams go away.
        if let Err(e) = self.io.stdout.flush() {
            log::debug!("failed to flush stdout on close: {}", e);
        }
        if let Err(e) = self.io.stderr.flush() {
            log::debug!("failed to flush stderr on close: {}", e);
        }
        log::debug!("environment closed");
    }
}

/// Builds [`HostEnv`]s wired to the real process environment.
#[derive(Debug)]
pub struct HostRuntime {
    config: UbiConfig,
}

impl HostRuntime {
    /// A runtime that validates `config` each time it is opened.
    pub fn new(config: UbiConfig) -> Self {
        Self { config }
    }
}

impl Runtime for HostRuntime {
    type Env = HostEnv;

    fn open(&mut self) -> Result<HostEnv, LaunchError> {
        check_api_url(&self.config.api_url)?;
        Ok(HostEnv::new(
            self.config.clone(),
            HostIo::inherit(),
            Box::new(UreqTransport::new()),
            Box::new(SystemRunner),
        ))
    }
}

/// Rejects endpoints no request could ever be sent to.
fn check_api_url(url: &str) -> Result<(), LaunchError> {
    let uri: ureq::http::Uri = url
        .parse()
        .map_err(|e| LaunchError::Initialization(format!("invalid UBI_URL '{}': {}", url, e)))?;

    match uri.scheme_str() {
        Some("http") | Some("https") if uri.host().is_some() => Ok(()),
        _ => Err(LaunchError::Initialization(format!(
            "UBI_URL '{}' is not an absolute http(s) URL",
            url
        ))),
    }
}
