//! # devm Up Command
//!
//! File: cli/src/commands/up.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Implements `devm up <name>`: guarantees that the named container is
//! running on the dev machine. If the control plane reports the machine
//! itself is not started, the command starts it with the configured region
//! and size, waits briefly for boot, and retries the container start once.
//!
//! ## Usage
//!
//! ```bash
//! # Start (or confirm) the container 'webdev', image defaults to the name
//! devm up webdev
//!
//! # Start it from an explicit image
//! devm up webdev --image ubuntu:24.04
//! ```
//!
use crate::common::machines::LifecycleRequest;
use crate::core::{config, error::Result};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `devm up`.
#[derive(Parser, Debug)]
#[command(
    about = "Ensure a container is running on your dev machine",
    long_about = "Starts the named container, booting the dev machine first if it is not running.\n\
                  Already-running containers are left untouched; the command succeeds without\n\
                  any remote change. The image defaults to the container name."
)]
pub struct UpArgs {
    /// Container name (lowercase letters, digits, and hyphens).
    name: String,

    /// Image reference to start the container from. Defaults to the
    /// container name.
    #[arg(short, long)]
    image: Option<String>,
}

/// Handler for `devm up`.
pub async fn handle_up(args: UpArgs) -> Result<()> {
    info!("Handling up command...");
    debug!("Up args: {:?}", args);

    // Validation happens before any config or network work.
    let request = LifecycleRequest::new(&args.name, args.image.as_deref())?;

    let cfg = config::load_config().context("Failed to load configuration")?;
    let driver = super::build_driver(&cfg)?;

    let state = driver
        .up(&request)
        .await
        .with_context(|| format!("Failed to bring up container '{}'", request.name()))?;

    println!("Container '{}' is {}.", request.name(), state);
    Ok(())
}
