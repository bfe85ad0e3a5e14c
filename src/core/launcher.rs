// src/core/launcher.rs

//! Process lifecycle for a hosted program.
//!
//! The launcher acquires one execution environment, hands the normalized
//! process arguments to the program, runs it, and turns the environment's
//! error state into an exit status. The environment is released exactly
//! once on every path that acquired it.

use crate::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::core::argv::Argv;
use crate::core::error::{LaunchError, ProgramError};
use std::ffi::{OsStr, OsString};
use std::io::Write;

/// Fixed diagnostic written when the environment cannot be acquired.
pub const INIT_FAILURE_MESSAGE: &str = "! Unable to initialize the ubi runtime";

/// Hands out execution environments.
pub trait Runtime {
    /// The environment this runtime hands out.
    type Env: Environment;

    /// Acquires a fresh environment. Nothing is held when this fails.
    fn open(&mut self) -> Result<Self::Env, LaunchError>;
}

/// One live execution environment.
pub trait Environment {
    /// Records an error the program did not handle.
    fn raise(&mut self, error: ProgramError);

    /// The error left behind by the last run, if any.
    fn unhandled_error(&self) -> Option<&ProgramError>;

    /// Releases everything the environment owns.
    fn close(self);
}

/// The logic executed inside an environment.
pub trait Program<E: Environment> {
    /// Runs once with the process arguments. An `Err` becomes the environment's unhandled error.
    fn run(&mut self, env: &mut E, argv: &Argv) -> Result<(), ProgramError>;
}

/// Launch stages, logged at trace level as they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    EnvAcquired,
    ArgsBound,
    Executed,
    Closed,
}

/// Runs `program` once with the arguments in `os_args` (argv[0] included)
/// and returns the process exit status.
///
/// Only the acquisition failure path writes to `stderr`; everything else the
/// user sees comes from the program itself.
pub fn launch<R, P, I, N>(
    runtime: &mut R,
    program: &mut P,
    os_args: I,
    normalize: N,
    stderr: &mut dyn Write,
) -> i32
where
    R: Runtime,
    P: Program<R::Env>,
    I: IntoIterator<Item = OsString>,
    N: Fn(&OsStr) -> String,
{
    let env = match runtime.open() {
        Ok(env) => env,
        Err(e) => {
            // Nothing else can be reported if stderr itself is gone.
            let _ = writeln!(stderr, "{}", INIT_FAILURE_MESSAGE);
            // The cause is only visible under RUST_LOG=trace.
            log::trace!("{}", e);
            return EXIT_FAILURE;
        }
    };
    log::trace!("launcher stage: {:?}", Stage::EnvAcquired);

    let mut env = scopeguard::guard(env, |env| {
        env.close();
        log::trace!("launcher stage: {:?}", Stage::Closed);
    });

    let argv = Argv::from_os_args(os_args, normalize);
    log::trace!("launcher stage: {:?} ({} args)", Stage::ArgsBound, argv.len());

    if let Err(e) = program.run(&mut *env, &argv) {
        env.raise(e);
    }
    log::trace!("launcher stage: {:?}", Stage::Executed);

    let status = env
        .unhandled_error()
        .map_or(EXIT_SUCCESS, ProgramError::exit_code);

    drop(env);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Mutex;

    /// Keeps every record logged from this module, across all tests in the binary.
    struct CaptureLogger;

    static CAPTURED: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if record.target() == "ubi::core::launcher" {
                CAPTURED
                    .lock()
                    .unwrap()
                    .push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    /// Shared counters observed by the tests after the launch returns.
    #[derive(Default)]
    struct Counters {
        opened: Cell<usize>,
        closed: Cell<usize>,
        runs: Cell<usize>,
        seen_args: RefCell<Option<Vec<String>>>,
    }

    struct FakeRuntime {
        counters: Rc<Counters>,
        fail: bool,
    }

    struct FakeEnv {
        counters: Rc<Counters>,
        error: Option<ProgramError>,
    }

    impl Runtime for FakeRuntime {
        type Env = FakeEnv;

        fn open(&mut self) -> Result<FakeEnv, LaunchError> {
            if self.fail {
                return Err(LaunchError::Initialization("injected".to_string()));
            }
            self.counters.opened.set(self.counters.opened.get() + 1);
            Ok(FakeEnv {
                counters: Rc::clone(&self.counters),
                error: None,
            })
        }
    }

    impl Environment for FakeEnv {
        fn raise(&mut self, error: ProgramError) {
            self.error = Some(error);
        }

        fn unhandled_error(&self) -> Option<&ProgramError> {
            self.error.as_ref()
        }

        fn close(self) {
            self.counters.closed.set(self.counters.closed.get() + 1);
        }
    }

    /// Records its arguments and fails with the configured error, if any.
    struct FakeProgram {
        counters: Rc<Counters>,
        outcome: Option<ProgramError>,
        write_to_env_directly: bool,
    }

    impl Program<FakeEnv> for FakeProgram {
        fn run(&mut self, env: &mut FakeEnv, argv: &Argv) -> Result<(), ProgramError> {
            self.counters.runs.set(self.counters.runs.get() + 1);
            *self.counters.seen_args.borrow_mut() = Some(argv.to_vec());
            match self.outcome.take() {
                Some(error) if self.write_to_env_directly => {
                    env.raise(error);
                    Ok(())
                }
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    fn setup(
        fail: bool,
        outcome: Option<ProgramError>,
    ) -> (FakeRuntime, FakeProgram, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        let runtime = FakeRuntime {
            counters: Rc::clone(&counters),
            fail,
        };
        let program = FakeProgram {
            counters: Rc::clone(&counters),
            outcome,
            write_to_env_directly: false,
        };
        (runtime, program, counters)
    }

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    fn run_launch(
        runtime: &mut FakeRuntime,
        program: &mut FakeProgram,
        list: &[&str],
    ) -> (i32, String) {
        let mut stderr = Vec::new();
        let status = launch(
            runtime,
            program,
            args(list),
            crate::core::argv::normalize_os,
            &mut stderr,
        );
        (status, String::from_utf8(stderr).unwrap())
    }

    #[test]
    fn test_success_exits_zero_and_closes_once() {
        let (mut runtime, mut program, counters) = setup(false, None);

        let (status, stderr) = run_launch(&mut runtime, &mut program, &["ubi", "vm", "list"]);

        assert_eq!(status, 0);
        assert!(stderr.is_empty());
        assert_eq!(counters.opened.get(), 1);
        assert_eq!(counters.closed.get(), 1);
        assert_eq!(counters.runs.get(), 1);
    }

    #[test]
    fn test_arguments_are_bound_in_order_without_program_name() {
        let (mut runtime, mut program, counters) = setup(false, None);

        run_launch(
            &mut runtime,
            &mut program,
            &["/usr/bin/ubi", "pg", "eu/db", "psql", "--", "-c", "select 1"],
        );

        let seen = counters.seen_args.borrow().clone().unwrap();
        assert_eq!(seen, vec!["pg", "eu/db", "psql", "--", "-c", "select 1"]);
    }

    #[test]
    fn test_zero_arguments_bind_an_empty_list() {
        let (mut runtime, mut program, counters) = setup(false, None);

        let (status, _) = run_launch(&mut runtime, &mut program, &["ubi"]);

        assert_eq!(status, 0);
        assert_eq!(counters.seen_args.borrow().clone(), Some(Vec::new()));
    }

    #[test]
    fn test_acquisition_failure_writes_one_line_and_skips_run() {
        let (mut runtime, mut program, counters) = setup(true, None);

        let (status, stderr) = run_launch(&mut runtime, &mut program, &["ubi", "vm", "list"]);

        assert_eq!(status, 1);
        assert_eq!(stderr, format!("{}\n", INIT_FAILURE_MESSAGE));
        assert_eq!(stderr.lines().count(), 1);
        assert_eq!(counters.runs.get(), 0);
        assert!(counters.seen_args.borrow().is_none());
        assert_eq!(counters.opened.get(), 0);
        assert_eq!(counters.closed.get(), 0);
    }

    #[test]
    fn test_acquisition_failure_cause_is_logged_only_at_trace() {
        // --- Setup ---
        let _ = log::set_logger(&CaptureLogger);
        log::set_max_level(log::LevelFilter::Trace);
        let (mut runtime, mut program, _) = setup(true, None);

        // --- Execute ---
        let (status, stderr) = run_launch(&mut runtime, &mut program, &["ubi"]);

        // --- Assert ---
        assert_eq!(status, 1);
        assert_eq!(stderr.lines().count(), 1);
        let captured = CAPTURED.lock().unwrap();
        assert!(
            captured
                .iter()
                .all(|(level, _)| *level == log::Level::Trace),
            "a debug-enabled run must not print extra lines: {:?}",
            *captured
        );
        assert!(captured.iter().any(|(_, msg)| msg.contains("injected")));
    }

    #[test]
    fn test_unhandled_error_exits_one_silently_and_closes_once() {
        let (mut runtime, mut program, counters) = setup(false, Some(ProgramError::MissingToken));

        let (status, stderr) = run_launch(&mut runtime, &mut program, &["ubi", "vm", "list"]);

        assert_eq!(status, 1);
        assert!(stderr.is_empty(), "the launcher must not report execution errors");
        assert_eq!(counters.opened.get(), 1);
        assert_eq!(counters.closed.get(), 1);
    }

    #[test]
    fn test_error_raised_inside_environment_is_detected() {
        let (mut runtime, mut program, counters) = setup(false, Some(ProgramError::ReadConfirmation));
        program.write_to_env_directly = true;

        let (status, _) = run_launch(&mut runtime, &mut program, &["ubi"]);

        assert_eq!(status, 1);
        assert_eq!(counters.closed.get(), 1);
    }

    #[test]
    fn test_child_exit_code_is_propagated() {
        let (mut runtime, mut program, counters) = setup(false, Some(ProgramError::ChildExited(42)));

        let (status, _) = run_launch(&mut runtime, &mut program, &["ubi", "vm", "eu/x", "ssh"]);

        assert_eq!(status, 42);
        assert_eq!(counters.closed.get(), 1);
    }
}
