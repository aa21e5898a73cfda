//! Build script for learnosity-sdk
//!
//! Captures the compiler version reported in request telemetry.

use std::process::Command;

fn main() {
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());

    // `rustc 1.85.0 (4d91de4e4 2025-02-17)` -> `1.85.0`
    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .and_then(|s| s.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=LEARNOSITY_RUSTC_VERSION={}", rustc_version);
    println!("cargo:rerun-if-env-changed=RUSTC");
}
