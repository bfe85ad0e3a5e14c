// src/core/config.rs

//! Environment-driven settings.

use crate::constants::{
    ALLOWED_PROGRAMS, DEFAULT_API_URL, ENV_DEBUG, ENV_PROGRAM_PREFIX, ENV_TOKEN, ENV_URL,
    UBI_VERSION,
};
use std::collections::HashMap;

/// Settings read once from the process environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbiConfig {
    /// Personal access token. Only required once a request is actually sent.
    pub token: Option<String>,
    /// CLI endpoint, `UBI_URL` or the public API.
    pub api_url: String,
    /// `UBI_DEBUG=1`.
    pub debug: bool,
    /// Sent as `X-Ubi-Version`.
    pub version: String,
    /// Executable path overrides keyed by program name (`ssh` -> `$UBI_SSH`).
    pub program_overrides: HashMap<String, String>,
}

impl UbiConfig {
    /// Loads the configuration from the real process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let program_overrides = ALLOWED_PROGRAMS
            .iter()
            .filter_map(|prog| {
                non_empty(&program_override_var(prog)).map(|path| (prog.to_string(), path))
            })
            .collect();

        Self {
            token: non_empty(ENV_TOKEN),
            api_url: non_empty(ENV_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            debug: lookup(ENV_DEBUG).as_deref() == Some("1"),
            version: UBI_VERSION.to_string(),
            program_overrides,
        }
    }

    /// Resolves the executable to spawn for `prog`, honoring `UBI_<PROG>`.
    pub fn executable_for<'a>(&'a self, prog: &'a str) -> &'a str {
        self.program_overrides
            .get(prog)
            .map(String::as_str)
            .unwrap_or(prog)
    }
}

impl Default for UbiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Name of the variable overriding the executable for `prog`.
fn program_override_var(prog: &str) -> String {
    format!("{}{}", ENV_PROGRAM_PREFIX, prog.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = UbiConfig::default();
        assert_eq!(config.token, None);
        assert_eq!(config.api_url, "https://api.ubicloud.com/cli");
        assert!(!config.debug);
        assert!(config.program_overrides.is_empty());
        assert!(!config.version.is_empty());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = UbiConfig::from_lookup(lookup_from(&[
            ("UBI_TOKEN", "pat-123"),
            ("UBI_URL", "http://localhost:9292/cli"),
            ("UBI_DEBUG", "1"),
            ("UBI_SSH", "/opt/bin/ssh"),
            ("UBI_PG_DUMPALL", "/usr/lib/pg/pg_dumpall"),
        ]));

        assert_eq!(config.token.as_deref(), Some("pat-123"));
        assert_eq!(config.api_url, "http://localhost:9292/cli");
        assert!(config.debug);
        assert_eq!(config.executable_for("ssh"), "/opt/bin/ssh");
        assert_eq!(config.executable_for("pg_dumpall"), "/usr/lib/pg/pg_dumpall");
        assert_eq!(config.executable_for("scp"), "scp");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = UbiConfig::from_lookup(lookup_from(&[
            ("UBI_TOKEN", ""),
            ("UBI_URL", ""),
            ("UBI_SSH", ""),
        ]));
        assert_eq!(config.token, None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.executable_for("ssh"), "ssh");
    }

    #[test]
    fn test_debug_requires_exact_one() {
        for value in ["true", "yes", "0", " 1"] {
            let config = UbiConfig::from_lookup(lookup_from(&[("UBI_DEBUG", value)]));
            assert!(!config.debug, "UBI_DEBUG={value:?} must not enable debug");
        }
    }

    #[test]
    fn test_override_only_for_allowed_programs() {
        let config = UbiConfig::from_lookup(lookup_from(&[("UBI_CURL", "/bin/curl")]));
        assert_eq!(config.executable_for("curl"), "curl");
    }
}
