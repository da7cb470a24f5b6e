//! # devm MOSH Command
//!
//! File: cli/src/commands/mosh.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Implements `devm mosh <name>`: like `devm ssh`, but hands the session to
//! the local mosh client for roaming and intermittent-connectivity use.
//!
use crate::common::attach::{self, AttachCommand};
use crate::core::{config, error::Result, validate};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `devm mosh`.
#[derive(Parser, Debug)]
#[command(
    about = "Open a MOSH session into a container",
    long_about = "Resolves the dev machine's address and execs the local mosh client into the\n\
                  named container. Requires mosh on this host and mosh-server on the machine."
)]
pub struct MoshArgs {
    /// Container name to attach to.
    name: String,
}

/// Handler for `devm mosh`.
pub async fn handle_mosh(args: MoshArgs) -> Result<()> {
    info!("Handling mosh command...");
    debug!("Mosh args: {:?}", args);

    validate::validate_container_name(&args.name)?;

    let cfg = config::load_config().context("Failed to load configuration")?;
    let driver = super::build_driver(&cfg)?;

    let ip = driver
        .machine_ip()
        .await
        .context("Failed to resolve the dev machine address")?;
    debug!("Machine address: {}", ip);

    let command = AttachCommand::mosh(&ip, &args.name, &cfg.ssh.user)?;
    let never = attach::exec(command)?;
    match never {}
}
