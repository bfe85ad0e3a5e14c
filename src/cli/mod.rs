// src/cli/mod.rs

//! The Ubicloud client logic hosted by the launcher.

pub mod program;
pub mod validate;
