//! # devm PS Command
//!
//! File: cli/src/commands/ps.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Implements `devm ps`: lists the containers on the dev machine in the
//! order the control plane reports them. An empty machine prints a short
//! notice rather than an empty table.
//!
use crate::core::{config, error::Result};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `devm ps`.
#[derive(Parser, Debug)]
#[command(about = "List containers on your dev machine")]
pub struct PsArgs {}

/// Handler for `devm ps`.
pub async fn handle_ps(args: PsArgs) -> Result<()> {
    info!("Handling ps command...");
    debug!("Ps args: {:?}", args);

    let cfg = config::load_config().context("Failed to load configuration")?;
    let driver = super::build_driver(&cfg)?;

    let containers = driver
        .ps()
        .await
        .context("Failed to list containers")?;

    if containers.is_empty() {
        println!("No containers running.");
        return Ok(());
    }

    println!("{:<24} {:<32} {:<10}", "NAME", "IMAGE", "STATE");
    for c in &containers {
        println!("{:<24} {:<32} {:<10}", c.name, c.image, c.state);
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ps_args_parsing() {
        assert!(PsArgs::try_parse_from(["ps"]).is_ok());
        // ps takes no positional arguments.
        assert!(PsArgs::try_parse_from(["ps", "extra"]).is_err());
    }
}
