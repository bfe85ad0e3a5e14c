//! # System Interaction Layer
//!
//! Boundary between the hosted program and the outside world.
//!
//! ## Modules
//!
//! - **`host`**: The concrete execution environment: stdio, configuration and the
//!   unhandled-error slot, plus the runtime that builds it.
//! - **`transport`**: Blocking HTTP client for the Ubicloud CLI endpoint.
//! - **`executor`**: Spawns validated local tools (`ssh`, `psql`, ...) wired to the
//!   user's terminal.

pub mod executor;
pub mod host;
pub mod transport;
