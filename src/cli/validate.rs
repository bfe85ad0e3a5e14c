// src/cli/validate.rs

//! Checks on argument lists returned by the server.

use crate::core::argv::Argv;
use std::collections::HashSet;
use thiserror::Error;

/// Why a server-returned argument list was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// More than one argument is not from the submitted argv.
    #[error("! Invalid server response, multiple arguments not in submitted argv")]
    MultipleCustomArguments,
    /// A new argument appears before `--`.
    #[error("! Invalid server response, argument before '--' not in submitted argv")]
    CustomArgumentBeforeSeparator,
    /// Neither `--` nor a `pg_dumpall` connection argument is present.
    #[error("! Invalid server response, no '--' in returned argv")]
    MissingSeparator,
}

/// Checks the argument list the server wants `prog` executed with.
///
/// Every argument must come from the submitted `original` argv, with one
/// exception: a single extra argument placed after `--` (or, for
/// `pg_dumpall`, a single `-d...` connection argument).
pub fn validate_arguments(
    prog: &str,
    received: &[String],
    original: &Argv,
) -> Result<(), ValidationError> {
    // Built from the submitted argv only; the launcher's own path (argv[0]) is not in it.
    let original_set: HashSet<&str> = original.iter().map(String::as_str).collect();

    let mut seen_custom = false;
    let mut seen_separator = false;
    let mut pg_dumpall_custom = false;

    for arg in received {
        if arg == "--" {
            seen_separator = true;
        } else if !original_set.contains(arg.as_str()) {
            if seen_custom {
                return Err(ValidationError::MultipleCustomArguments);
            } else if seen_separator {
                seen_custom = true;
            } else if prog == "pg_dumpall" && arg.starts_with("-d") {
                seen_custom = true;
                pg_dumpall_custom = true;
            } else {
                return Err(ValidationError::CustomArgumentBeforeSeparator);
            }
        }
    }

    if !seen_separator && !pg_dumpall_custom {
        return Err(ValidationError::MissingSeparator);
    }
    Ok(())
}
