// src/cli/program.rs

//! The Ubicloud API client run by the launcher.

use crate::{
    cli::validate::validate_arguments,
    constants::{
        ALLOWED_PROGRAMS, HEADER_COMMAND_EXECUTE, HEADER_CONFIRM, HEADER_PGPASSWORD,
        MAX_EXEC_BODY_BYTES, PG_PROGRAMS,
    },
    core::{argv::Argv, error::ProgramError, launcher::Program},
    system::{
        executor::{CommandSpec, ExecutionError},
        host::HostEnv,
        transport::{ApiRequest, ApiResponse},
    },
};
use serde::Serialize;
use std::io::{Read, Write};

#[derive(Serialize)]
struct RequestBody<'a> {
    argv: &'a Argv,
}

/// The Ubicloud command-line client.
///
/// Submits argv to the CLI endpoint and acts on the answer: print it, ask
/// for one confirmation and resubmit, or run a validated local tool.
#[derive(Debug)]
pub struct UbiProgram {
    allow_confirmation: bool,
}

impl UbiProgram {
    /// A client that has not yet used its one confirmation.
    pub fn new() -> Self {
        Self {
            allow_confirmation: true,
        }
    }

    /// Submits `args` and handles the response. `original` is always the argv
    /// the user typed, even after a confirmation was prepended.
    fn send_request(
        &mut self,
        env: &mut HostEnv,
        args: &Argv,
        original: &Argv,
    ) -> Result<(), ProgramError> {
        let body =
            serde_json::to_vec(&RequestBody { argv: args }).map_err(ProgramError::EncodeRequest)?;
        let token = env
            .config
            .token
            .clone()
            .ok_or(ProgramError::MissingToken)?;

        let request = ApiRequest {
            url: env.config.api_url.clone(),
            headers: vec![
                ("Authorization", format!("Bearer: {}", token)),
                ("X-Ubi-Version", env.config.version.clone()),
                ("Content-Type", "application/json".to_string()),
                ("Accept", "text/plain".to_string()),
                ("Connection", "close".to_string()),
            ],
            body,
        };

        log::debug!("sending: {:?}", &**args);
        let response = env
            .transport
            .post(&request)
            .map_err(ProgramError::SendRequest)?;

        self.process_response(env, &response, args, original)
    }

    fn process_response(
        &mut self,
        env: &mut HostEnv,
        response: &ApiResponse,
        args: &Argv,
        original: &Argv,
    ) -> Result<(), ProgramError> {
        if !response.is_success() {
            if let Err(e) = copy_body(&mut *env.io.stderr, &response.body, "stderr") {
                let _ = writeln!(env.io.stderr, "{}", e);
            }
            return Err(ProgramError::ServerRejected(response.status));
        }

        if let Some(prog) = response.header(HEADER_COMMAND_EXECUTE) {
            execute_validated_command(env, prog, response, original)
        } else if let Some(prompt) = response.header(HEADER_CONFIRM) {
            self.handle_confirmation(env, prompt, &response.body, args, original)
        } else {
            // A broken stdout is reported but does not fail the command.
            if let Err(e) = copy_body(&mut *env.io.stdout, &response.body, "stdout") {
                let _ = writeln!(env.io.stderr, "{}", e);
            }
            Ok(())
        }
    }

    fn handle_confirmation(
        &mut self,
        env: &mut HostEnv,
        prompt: &str,
        body: &[u8],
        args: &Argv,
        original: &Argv,
    ) -> Result<(), ProgramError> {
        if !self.allow_confirmation {
            return Err(ProgramError::RepeatedConfirmation);
        }
        self.allow_confirmation = false;

        copy_body(&mut *env.io.stdout, body, "stdout")?;
        let _ = write!(env.io.stdout, "\n{}: ", prompt);
        let _ = env.io.stdout.flush();

        let mut line = String::new();
        match env.io.stdin.read_line(&mut line) {
            Ok(0) | Err(_) => return Err(ProgramError::ReadConfirmation),
            Ok(_) => {}
        }
        let answer = strip_line_ending(&line);

        let confirmed = args.prepended(["--confirm", answer]);
        self.send_request(env, &confirmed, original)
    }
}

impl Default for UbiProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl Program<HostEnv> for UbiProgram {
    fn run(&mut self, env: &mut HostEnv, argv: &Argv) -> Result<(), ProgramError> {
        self.allow_confirmation = true;

        let result = self.send_request(env, argv, argv);
        if let Err(e) = &result {
            if !e.is_silent() {
                let _ = writeln!(env.io.stderr, "{}", e);
            }
        }
        result
    }
}

/// Runs the local tool named by the server after checking it against the
/// user's own argv.
fn execute_validated_command(
    env: &mut HostEnv,
    prog: &str,
    response: &ApiResponse,
    original: &Argv,
) -> Result<(), ProgramError> {
    // `original` excludes the program name, so argv[0] is never an acceptable
    // program or argument here.
    if !original.contains(prog) {
        return Err(ProgramError::ProgramNotInArgv(prog.to_string()));
    }
    if !ALLOWED_PROGRAMS.contains(&prog) {
        return Err(ProgramError::UnsupportedProgram(prog.to_string()));
    }

    let mut child_env = Vec::new();
    if PG_PROGRAMS.contains(&prog) {
        if let Some(password) = response.header(HEADER_PGPASSWORD) {
            child_env.push(("PGPASSWORD".to_string(), password.to_string()));
        }
    }

    let mut raw = Vec::new();
    response
        .body
        .as_slice()
        .take(MAX_EXEC_BODY_BYTES)
        .read_to_end(&mut raw)
        .map_err(ProgramError::ReadBody)?;
    let args: Vec<String> = String::from_utf8_lossy(&raw)
        .split('\0')
        .map(String::from)
        .collect();

    let executable = env.config.executable_for(prog).to_string();
    if let Err(e) = validate_arguments(prog, &args, original) {
        log::debug!("failure: {} {:?}", executable, args);
        return Err(e.into());
    }

    log::debug!("exec: {} {:?}", executable, args);
    let _ = env.io.stdout.flush();

    let spec = CommandSpec {
        program: executable,
        args,
        env: child_env,
    };
    match env.runner.run(&spec) {
        Ok(0) => Ok(()),
        Ok(code) => Err(ProgramError::ChildExited(code)),
        Err(ExecutionError::Spawn(e)) => Err(ProgramError::Spawn(e)),
    }
}

fn copy_body(out: &mut dyn Write, body: &[u8], stream: &'static str) -> Result<(), ProgramError> {
    out.write_all(body)
        .and_then(|()| out.flush())
        .map_err(|source| ProgramError::WriteOutput { stream, source })
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
