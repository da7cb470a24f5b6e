//! # devm Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Aggregates the top-level commands of the devm CLI and provides the one
//! shared construction helper that wires configuration, token provider,
//! HTTP transport, and driver together for the command handlers.
//!
//! ## Commands
//!
//! - `up`: ensure a container is running, bootstrapping the machine if needed
//! - `down`: stop a container
//! - `ps`: list containers on the machine
//! - `ssh` / `mosh`: attach an interactive session to a container
//! - `machine`: machine lifecycle group (start, stop, status, ip)
//!
use crate::common::auth::FileTokenProvider;
use crate::common::machines::{DriverSettings, HttpTransport, LifecycleDriver};
use crate::core::config::Config;
use crate::core::error::Result;

/// Implements `devm down`.
pub mod down;
/// Implements the `devm machine` command group.
pub mod machine;
/// Implements `devm mosh`.
pub mod mosh;
/// Implements `devm ps`.
pub mod ps;
/// Implements `devm ssh`.
pub mod ssh;
/// Implements `devm up`.
pub mod up;

/// Builds the production driver stack: file-cached token provider feeding
/// the authenticated HTTP transport, settings from the loaded configuration.
pub(crate) fn build_driver(
    cfg: &Config,
) -> Result<LifecycleDriver<HttpTransport<FileTokenProvider>>> {
    let tokens = FileTokenProvider::from_config(cfg)?;
    let transport = HttpTransport::new(cfg, tokens)?;
    Ok(LifecycleDriver::new(
        transport,
        DriverSettings::from_config(cfg),
    ))
}
