//! # devm SSH Command
//!
//! File: cli/src/commands/ssh.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Implements `devm ssh <name>`: resolves the dev machine's address from the
//! control plane and replaces this process with an interactive SSH session
//! into the named container. On success the command never returns; the SSH
//! client owns the terminal from there.
//!
//! ## Usage
//!
//! ```bash
//! devm ssh webdev
//!
//! # Forward the local SSH agent into the session
//! devm ssh -A webdev
//! ```
//!
use crate::common::attach::{self, AttachCommand};
use crate::core::{config, error::Result, validate};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `devm ssh`.
#[derive(Parser, Debug)]
#[command(
    about = "Open an SSH session into a container",
    long_about = "Resolves the dev machine's address and execs the local ssh client with a TTY\n\
                  into the named container. The container must already be running; use\n\
                  'devm up' first."
)]
pub struct SshArgs {
    /// Container name to attach to.
    name: String,

    /// Forward the local SSH agent into the session.
    #[arg(short = 'A', long = "forward-agent")]
    forward_agent: bool,
}

/// Handler for `devm ssh`.
pub async fn handle_ssh(args: SshArgs) -> Result<()> {
    info!("Handling ssh command...");
    debug!("Ssh args: {:?}", args);

    validate::validate_container_name(&args.name)?;

    let cfg = config::load_config().context("Failed to load configuration")?;
    let driver = super::build_driver(&cfg)?;

    let ip = driver
        .machine_ip()
        .await
        .context("Failed to resolve the dev machine address")?;
    debug!("Machine address: {}", ip);

    let command = AttachCommand::ssh(&ip, &args.name, &cfg.ssh.user, args.forward_agent)?;
    let never = attach::exec(command)?;
    match never {}
}
