//! # devm Machine Command Group
//!
//! File: cli/src/commands/machine/mod.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Implements the `devm machine` group: direct control of the dev machine
//! itself, independent of any container. `devm up` bootstraps the machine
//! automatically when needed; this group exists for explicit management.
//!
//! ## Usage
//!
//! ```bash
//! devm machine start    # boot the machine with the configured region/size
//! devm machine stop     # shut the machine down (containers stop with it)
//! devm machine status   # remote-reported machine state
//! devm machine ip       # print the machine's reachable address
//! ```
//!
use crate::common::machines::MachineStatus;
use crate::core::{config, error::Result};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

/// Arguments for the `devm machine` command group.
#[derive(Parser, Debug)]
#[command(about = "Manage the dev machine itself")]
pub struct MachineArgs {
    /// The machine subcommand to execute.
    #[command(subcommand)]
    command: MachineCommand,
}

/// Subcommands under `devm machine`.
#[derive(Subcommand, Debug)]
enum MachineCommand {
    /// Start the dev machine with the configured region and size.
    Start,
    /// Stop the dev machine. Running containers stop with it.
    Stop,
    /// Show the remote-reported machine status.
    Status,
    /// Print the machine's reachable IP address.
    Ip,
}

/// Dispatcher for the `devm machine` group.
pub async fn handle_machine(args: MachineArgs) -> Result<()> {
    info!("Handling machine command...");
    debug!("Machine args: {:?}", args);

    let cfg = config::load_config().context("Failed to load configuration")?;
    let driver = super::build_driver(&cfg)?;

    match args.command {
        MachineCommand::Start => {
            let status = driver
                .start_machine()
                .await
                .context("Failed to start the dev machine")?;
            println!("Machine is {}.", status.state);
            print_details(&status);
        }
        MachineCommand::Stop => {
            let status = driver
                .stop_machine()
                .await
                .context("Failed to stop the dev machine")?;
            println!("Machine is {}.", status.state);
        }
        MachineCommand::Status => {
            let status = driver
                .machine_status()
                .await
                .context("Failed to query machine status")?;
            println!("Machine is {}.", status.state);
            print_details(&status);
        }
        MachineCommand::Ip => {
            let ip = driver
                .machine_ip()
                .await
                .context("Failed to resolve the machine address")?;
            println!("{ip}");
        }
    }
    Ok(())
}

fn print_details(status: &MachineStatus) {
    if let Some(region) = &status.region {
        println!("  region: {region}");
    }
    if let Some(size) = &status.size {
        println!("  size:   {size}");
    }
    if let Some(ip) = &status.ip {
        println!("  ip:     {ip}");
    }
}
