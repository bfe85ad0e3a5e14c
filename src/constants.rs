// src/constants.rs

/// Version string sent to the API in the `X-Ubi-Version` header.
pub const UBI_VERSION: &str = env!("UBI_VERSION_EFFECTIVE");

/// Endpoint used when `UBI_URL` is unset or empty.
pub const DEFAULT_API_URL: &str = "https://api.ubicloud.com/cli";

// --- Environment variables ---

/// Personal access token.
pub const ENV_TOKEN: &str = "UBI_TOKEN";
/// API endpoint override.
pub const ENV_URL: &str = "UBI_URL";
/// Set to `1` to enable debug logging.
pub const ENV_DEBUG: &str = "UBI_DEBUG";
/// Prefix of the per-program executable overrides (`UBI_SSH`, `UBI_PG_DUMP`, ...).
pub const ENV_PROGRAM_PREFIX: &str = "UBI_";

// --- Response headers (lower-cased) ---

/// Names the local tool to run with the NUL-separated body as its arguments.
pub const HEADER_COMMAND_EXECUTE: &str = "ubi-command-execute";
/// Prompt text; the client asks once, then resends with `--confirm`.
pub const HEADER_CONFIRM: &str = "ubi-confirm";
/// Password exported as `PGPASSWORD` to PostgreSQL tools.
pub const HEADER_PGPASSWORD: &str = "ubi-pgpassword";

/// Local tools the server may ask the client to execute.
pub const ALLOWED_PROGRAMS: &[&str] = &["ssh", "scp", "sftp", "psql", "pg_dump", "pg_dumpall"];

/// Subset of [`ALLOWED_PROGRAMS`] that accept a `PGPASSWORD`.
pub const PG_PROGRAMS: &[&str] = &["psql", "pg_dump", "pg_dumpall"];

/// Upper bound on the NUL-separated argument body of an execute response.
pub const MAX_EXEC_BODY_BYTES: u64 = 1024 * 1024;

/// Status returned when the runtime cannot be acquired or a program fails.
pub const EXIT_FAILURE: i32 = 1;
/// Status of a run that left no unhandled error.
pub const EXIT_SUCCESS: i32 = 0;
