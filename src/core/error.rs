// src/core/error.rs

//! Launcher and program error types.

use crate::constants::EXIT_FAILURE;
use thiserror::Error;

/// Raised when the execution environment cannot be acquired.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The runtime refused to start; the message is the cause.
    #[error("Runtime initialization failed: {0}")]
    Initialization(String),
}

/// An unhandled error left in the environment by a program run.
///
/// The `Display` of each variant is the exact diagnostic line shown to the user.
#[derive(Error, Debug)]
pub enum ProgramError {
    /// `UBI_TOKEN` is unset or empty.
    #[error("! Personal access token must be provided in UBI_TOKEN env variable for use")]
    MissingToken,
    /// The argv could not be serialized.
    #[error("! Error encoding request body")]
    EncodeRequest(#[source] serde_json::Error),
    /// Connection-level failure talking to the API.
    #[error("! Error sending http request")]
    SendRequest(#[source] anyhow::Error),
    /// The server answered with a non-success status; its body was already copied to stderr.
    #[error("server rejected the request with status {0}")]
    ServerRejected(u16),
    /// Copying the response body to a local stream failed.
    #[error("! Error copying response body to {stream}")]
    WriteOutput {
        /// `"stdout"` or `"stderr"`.
        stream: &'static str,
        /// Underlying write error.
        #[source]
        source: std::io::Error,
    },
    /// A second confirmation prompt arrived after `--confirm` was sent.
    #[error("! Invalid server response, repeated confirmation attempt")]
    RepeatedConfirmation,
    /// No confirmation line could be read from stdin.
    #[error("! Error reading confirmation")]
    ReadConfirmation,
    /// The requested tool was not named by the user.
    #[error("! Invalid server response, not executing program not in original argv")]
    ProgramNotInArgv(String),
    /// The requested tool is not in the allow list.
    #[error("! Invalid server response, unsupported program requested")]
    UnsupportedProgram(String),
    /// The execute body could not be read.
    #[error("! Error reading response body: {0}")]
    ReadBody(#[source] std::io::Error),
    /// The server-returned arguments failed validation.
    #[error("{0}")]
    InvalidArguments(#[from] crate::cli::validate::ValidationError),
    /// The tool could not be started.
    #[error("! Error executing program: {0}")]
    Spawn(#[source] std::io::Error),
    /// The executed tool exited unsuccessfully; its own output already explains why.
    #[error("program exited with status {0}")]
    ChildExited(i32),
}

impl ProgramError {
    /// Exit status the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ChildExited(code) if *code != 0 => *code,
            _ => EXIT_FAILURE,
        }
    }

    /// Whether the user has already seen everything there is to say about this error.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::ServerRejected(_) | Self::ChildExited(_))
    }
}
