//! # devm Error Types
//!
//! File: cli/src/core/error.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout devm. It provides a
//! consistent approach to error management with detailed error information
//! and context.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `DevmError`: a custom error enum using `thiserror` for the specific
//!   error kinds the lifecycle coordinator and CLI can produce
//! - `Result<T>`: a type alias for `anyhow::Result<T>` for flexible
//!   propagation and context wrapping
//!
//! The kinds fall into a few groups:
//! - Local, pre-flight failures (`Validation`, `Config`) that are rejected
//!   before any remote call is issued
//! - Remote outcomes (`NotFound`, `Conflict`, `Api`, `Remote`,
//!   `AuthRequired`)
//! - `MachineNotStarted`: the distinguished, *non-terminal* signal that
//!   triggers the driver's machine bootstrap path; it is consumed internally
//!   and only surfaces if the bounded retry is exhausted
//! - `IllegalTransition`: a state-machine violation. This indicates a defect,
//!   not a condition callers should retry.
//!
//! ## Examples
//!
//! Discriminating on specific kinds through an `anyhow::Error`:
//!
//! ```rust
//! match result {
//!     Ok(state) => println!("container is {state}"),
//!     Err(e) if e.downcast_ref::<DevmError>()
//!         .is_some_and(|de| matches!(de, DevmError::MachineNotStarted)) => {
//!         // bootstrap the machine, then retry once
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the devm application.
#[derive(Error, Debug)]
pub enum DevmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Container '{name}' not found.")]
    NotFound { name: String },

    #[error("No machine is provisioned for this account.")]
    MachineNotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Distinguished signal from the control plane: the container cannot be
    /// created because its machine is not running. Handled internally by the
    /// orchestration driver (one bootstrap retry), never a terminal failure
    /// on the first occurrence.
    #[error("Machine is not started.")]
    MachineNotStarted,

    #[error("Control-plane request failed: {source}")]
    Remote {
        #[from]
        source: reqwest::Error,
    },

    #[error("Control-plane API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not authenticated. Run the login flow to obtain a token.")]
    AuthRequired,

    /// Rejected by the state machine engine before any remote call. Should
    /// not occur in correct operation; treat as a defect rather than
    /// something to retry.
    #[error("Illegal lifecycle transition from '{from}' on event '{event}'")]
    IllegalTransition { from: String, event: String },

    #[error("Attach failed: {0}")]
    Attach(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;

/// Returns `true` when `err` wraps a `DevmError` matching `pred`.
///
/// Small helper so driver and command code can branch on kinds without
/// repeating the `downcast_ref` boilerplate.
pub fn is_kind(err: &anyhow::Error, pred: impl Fn(&DevmError) -> bool) -> bool {
    err.downcast_ref::<DevmError>().is_some_and(pred)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_display() {
        let validation = DevmError::Validation("bad name".to_string());
        assert_eq!(validation.to_string(), "Validation error: bad name");

        let not_found = DevmError::NotFound {
            name: "webdev".into(),
        };
        assert_eq!(not_found.to_string(), "Container 'webdev' not found.");

        let api = DevmError::Api {
            status: 502,
            message: "upstream unavailable".into(),
        };
        assert_eq!(
            api.to_string(),
            "Control-plane API error (HTTP 502): upstream unavailable"
        );

        let illegal = DevmError::IllegalTransition {
            from: "Stopping".into(),
            event: "StartRequested".into(),
        };
        assert!(illegal.to_string().contains("Stopping"));
        assert!(illegal.to_string().contains("StartRequested"));
    }

    #[test]
    fn test_is_kind_through_anyhow() {
        let err = anyhow!(DevmError::MachineNotStarted);
        assert!(is_kind(&err, |de| matches!(de, DevmError::MachineNotStarted)));
        assert!(!is_kind(&err, |de| matches!(de, DevmError::AuthRequired)));

        // A plain anyhow error carries no DevmError kind.
        let plain = anyhow!("some other failure");
        assert!(!is_kind(&plain, |de| matches!(
            de,
            DevmError::MachineNotStarted
        )));
    }
}
