//! # devm CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Shared helpers for the integration test files in `cli/tests/`. Each
//! non-module `.rs` file in that directory is compiled as a separate test
//! crate linked against the `devm` binary.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;

/// Command instance pointing at the compiled `devm` binary for this run.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn devm_cmd() -> Command {
    Command::cargo_bin("devm").expect("Failed to find devm binary for testing")
}
