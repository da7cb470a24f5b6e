//! # devm Interactive Attach (`common::attach`)
//!
//! File: cli/src/common/attach.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Builds and hands off interactive SSH and MOSH sessions into a container
//! on the dev machine. The CLI process does not proxy the session: on Unix
//! it replaces itself with the client binary via `exec`, so the terminal,
//! signals, and exit code all belong to the session from that point on.
//!
//! ## Session Shape
//!
//! SSH sessions request a TTY (`-t`) and append the container name as the
//! remote command, which the machine-side shell routes into the container.
//! Agent forwarding (`-A`) is opt-in. MOSH wraps the same addressing.
//!
use crate::core::error::{DevmError, Result};
use anyhow::anyhow;
use std::convert::Infallible;
use std::process::Command;
use tracing::info;

/// A fully-resolved attach invocation: program plus argument vector.
///
/// Arguments are passed as an argv, never through a shell, so container
/// names and addresses are not subject to word splitting or interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachCommand {
    program: String,
    args: Vec<String>,
}

impl AttachCommand {
    /// SSH session into `container` on the machine at `ip`.
    pub fn ssh(ip: &str, container: &str, user: &str, forward_agent: bool) -> Result<Self> {
        validate_address(ip)?;
        let mut args = vec!["-t".to_string()];
        if forward_agent {
            args.push("-A".to_string());
        }
        args.push(format!("{user}@{ip}"));
        args.push(container.to_string());
        Ok(Self {
            program: "ssh".to_string(),
            args,
        })
    }

    /// MOSH session into `container` on the machine at `ip`.
    pub fn mosh(ip: &str, container: &str, user: &str) -> Result<Self> {
        validate_address(ip)?;
        Ok(Self {
            program: "mosh".to_string(),
            args: vec![format!("{user}@{ip}"), container.to_string()],
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

fn validate_address(ip: &str) -> Result<()> {
    if ip.is_empty() || ip.chars().any(char::is_whitespace) {
        return Err(anyhow!(DevmError::Attach(format!(
            "invalid machine address '{ip}'"
        ))));
    }
    Ok(())
}

/// Replaces the current process with the attach client.
///
/// Returns only on failure; the `Infallible` success type makes that
/// explicit at call sites.
#[cfg(unix)]
pub fn exec(command: AttachCommand) -> Result<Infallible> {
    use std::os::unix::process::CommandExt;

    info!("Attaching: {} {}", command.program, command.args.join(" "));
    let err = Command::new(&command.program).args(&command.args).exec();
    // exec only returns when it failed to replace the process image.
    Err(anyhow!(DevmError::Attach(format!(
        "failed to exec {}: {}",
        command.program, err
    ))))
}

/// Fallback for platforms without `exec`: run the client as a child and
/// forward its exit code.
#[cfg(not(unix))]
pub fn exec(command: AttachCommand) -> Result<Infallible> {
    info!("Attaching: {} {}", command.program, command.args.join(" "));
    let status = Command::new(&command.program)
        .args(&command.args)
        .status()
        .map_err(|e| {
            anyhow!(DevmError::Attach(format!(
                "failed to launch {}: {}",
                command.program, e
            )))
        })?;
    tracing::debug!("Session ended with {status}");
    std::process::exit(status.code().unwrap_or(1));
}
