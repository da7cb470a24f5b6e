//! # devm Main Entry Point
//!
//! File: cli/src/main.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Entry point for the devm CLI: remote dev-machine and container control
//! from your terminal. This file handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Bring a container up (boots the machine if needed)
//! devm up webdev
//!
//! # Attach a session, with extra logging
//! devm -vv ssh webdev
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to the appropriate command handler
//! 4. Format and display any errors that occur
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

// Top-level modules of the CLI crate.
mod commands; // Command handlers (up, down, ps, ssh, mosh, machine).
mod common; // Shared functionality (machines, auth, attach).
mod core; // Core infrastructure (errors, config, validation).

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "devm",
    about = "devm: your dev machine, one command away",
    long_about = "Control a remote dev machine and its containers: bring containers up,\n\
                  stop them, list them, and attach SSH or MOSH sessions.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// All available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    Up(commands::up::UpArgs),
    Down(commands::down::DownArgs),
    Ps(commands::ps::PsArgs),
    Ssh(commands::ssh::SshArgs),
    Mosh(commands::mosh::MoshArgs),
    #[command(alias = "m")]
    Machine(commands::machine::MachineArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Up(args) => commands::up::handle_up(args).await,
        Commands::Down(args) => commands::down::handle_down(args).await,
        Commands::Ps(args) => commands::ps::handle_ps(args).await,
        Commands::Ssh(args) => commands::ssh::handle_ssh(args).await,
        Commands::Mosh(args) => commands::mosh::handle_mosh(args).await,
        Commands::Machine(args) => commands::machine::handle_machine(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
