// src/core/argv.rs

//! The argument vector handed to a hosted program.

use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::ops::Deref;

/// Converts one native (locale-encoded) argument into UTF-8.
///
/// Well-formed input converts losslessly. Invalid sequences are replaced with
/// U+FFFD rather than aborting the launch.
pub fn normalize_os(native: &OsStr) -> String {
    native.to_string_lossy().into_owned()
}

/// The ordered process arguments handed to a program, excluding the program name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Argv(Vec<String>);

impl Argv {
    /// Builds the list from a full OS argument iterator, skipping argv[0].
    pub fn from_os_args<I, N>(os_args: I, normalize: N) -> Self
    where
        I: IntoIterator<Item = OsString>,
        N: Fn(&OsStr) -> String,
    {
        Self(
            os_args
                .into_iter()
                .skip(1)
                .map(|arg| normalize(&arg))
                .collect(),
        )
    }

    /// Returns a new list with `prefix` placed in front of these arguments.
    pub fn prepended<S: Into<String>>(&self, prefix: impl IntoIterator<Item = S>) -> Self {
        let mut args: Vec<String> = prefix.into_iter().map(Into::into).collect();
        args.extend(self.0.iter().cloned());
        Self(args)
    }

    /// Exact-match membership test.
    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }
}

impl Deref for Argv {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Argv {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
