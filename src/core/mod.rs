// src/core/mod.rs

//! Launcher contract and the types it passes around.

pub mod argv;
pub mod config;
pub mod error;
pub mod launcher;
