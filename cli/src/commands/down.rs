//! # devm Down Command
//!
//! File: cli/src/commands/down.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Implements `devm down <name>`: stops the named container on the dev
//! machine. Unknown names fail with a not-found error; the machine itself
//! keeps running.
//!
//! ## Usage
//!
//! ```bash
//! devm down webdev
//! ```
//!
use crate::core::{config, error::Result, validate};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `devm down`.
#[derive(Parser, Debug)]
#[command(
    about = "Stop a container on your dev machine",
    long_about = "Stops the named container. The dev machine stays up; use 'devm machine stop'\n\
                  to shut the machine itself down."
)]
pub struct DownArgs {
    /// Container name to stop.
    name: String,
}

/// Handler for `devm down`.
pub async fn handle_down(args: DownArgs) -> Result<()> {
    info!("Handling down command...");
    debug!("Down args: {:?}", args);

    validate::validate_container_name(&args.name)?;

    let cfg = config::load_config().context("Failed to load configuration")?;
    let driver = super::build_driver(&cfg)?;

    let state = driver
        .down(&args.name)
        .await
        .with_context(|| format!("Failed to stop container '{}'", args.name))?;

    println!("Container '{}' is {}.", args.name, state);
    Ok(())
}
