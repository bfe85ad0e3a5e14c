// EN: src/bin/ubi.rs

use std::env;
use std::io;
use ubi::{
    cli::program::UbiProgram,
    core::{argv, config::UbiConfig, launcher},
    system::host::HostRuntime,
};

/// The main entry point of the `ubi` application.
/// It sets up logging, hands every argument to the hosted program untouched,
/// and exits with the status the launcher computed.
fn main() {
    let config = UbiConfig::from_env();
    init_logging(config.debug);

    let mut runtime = HostRuntime::new(config);
    let mut program = UbiProgram::new();

    let status = launcher::launch(
        &mut runtime,
        &mut program,
        env::args_os(),
        argv::normalize_os,
        &mut io::stderr(),
    );
    std::process::exit(status);
}

/// `UBI_DEBUG=1` turns on this crate's debug traces; otherwise `RUST_LOG` decides, defaulting to warnings.
fn init_logging(debug: bool) {
    logger_builder(env_logger::Env::default(), debug).init();
}

fn logger_builder(env: env_logger::Env<'_>, debug: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env.default_filter_or("warn"));
    if debug {
        // Only our own traces; dependency internals stay at the default filter.
        builder.filter_module("ubi", log::LevelFilter::Debug);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata};

    fn enabled(logger: &env_logger::Logger, target: &str, level: Level) -> bool {
        logger.enabled(&Metadata::builder().target(target).level(level).build())
    }

    /// Reads its filter from a variable nobody sets, so `RUST_LOG` cannot leak in.
    fn isolated_env() -> env_logger::Env<'static> {
        env_logger::Env::new().filter("UBI_TEST_LOG_FILTER_UNSET")
    }

    #[test]
    fn test_debug_raises_only_this_crate() {
        let logger = logger_builder(isolated_env(), true).build();

        assert!(enabled(&logger, "ubi::cli::program", Level::Debug));
        assert!(enabled(&logger, "ubi::system::transport", Level::Debug));
        assert!(!enabled(&logger, "ubi::core::launcher", Level::Trace));
        assert!(!enabled(&logger, "ureq::unversioned::transport", Level::Debug));
        assert!(enabled(&logger, "ureq::unversioned::transport", Level::Warn));
    }

    #[test]
    fn test_default_is_warnings_only() {
        let logger = logger_builder(isolated_env(), false).build();

        assert!(!enabled(&logger, "ubi::cli::program", Level::Debug));
        assert!(enabled(&logger, "ubi::cli::program", Level::Warn));
    }
}
