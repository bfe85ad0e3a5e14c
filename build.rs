// build.rs

use std::env;

fn main() {
    // --- 1. Determine the version string reported to the API ---
    // Release builds pass `UBI_VERSION`; local builds fall back to the crate version.
    let version = env::var("UBI_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_else(|| "undefined".to_string());

    println!("cargo:rustc-env=UBI_VERSION_EFFECTIVE={}", version);

    // --- 2. Inform Cargo about rerun triggers ---
    println!("cargo:rerun-if-env-changed=UBI_VERSION");
    println!("cargo:rerun-if-changed=build.rs");
}
