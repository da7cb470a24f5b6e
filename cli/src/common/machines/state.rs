//! # devm Lifecycle State Machine (`common::machines::state`)
//!
//! File: cli/src/common/machines/state.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Pure transition logic for machine and container lifecycle states. The
//! engine enumerates the legal transitions and rejects everything else with
//! `DevmError::IllegalTransition` *before* any remote call is issued, so
//! invalid intents fail fast and cheaply.
//!
//! ## Architecture
//!
//! Each transition function takes `(currentState, event)` and returns a
//! `Transition` carrying the next state plus the side effect the caller
//! should schedule (e.g. the actual remote start call). The functions are
//! pure: they never touch the registry or the transport. The orchestration
//! driver owns sequencing — it asks the engine whether a transition is
//! legal, commits it to the registry via compare-and-swap, and only then
//! performs the scheduled effect.
//!
//! Machine transitions:
//! - Pending → Starting, Stopped → Starting (start requested)
//! - Starting → Running (confirmed-running signal)
//! - Starting → Failed (timeout)
//! - Running → Stopping (stop requested)
//! - Stopping → Stopped (confirmed stopped)
//! - any → Failed (unrecoverable remote error)
//!
//! Container transitions:
//! - NotFound/Stopped/Failed → Creating (start requested; the owning machine
//!   must not be locally known to be down — see `may_reserve_create`)
//! - Creating → Running, Creating → Failed
//! - Running → Stopping, Stopping → Stopped
//!
use crate::core::error::{DevmError, Result};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the remote virtual machine hosting containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    /// Known by reference only; no remote state observed yet.
    Pending,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Lifecycle state of a container on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    NotFound,
    Creating,
    Running,
    Stopping,
    Stopped,
    Failed,
}

/// Events that drive machine transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent {
    StartRequested,
    ConfirmedRunning,
    StartTimedOut,
    StopRequested,
    ConfirmedStopped,
    RemoteFailed,
}

/// Events that drive container transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEvent {
    StartRequested,
    ConfirmedRunning,
    StartFailed,
    StopRequested,
    ConfirmedStopped,
}

/// Side effect the caller should schedule after committing a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartMachine,
    StopMachine,
    StartContainer,
    StopContainer,
}

/// Result of a legal transition: the next state and the effect to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub next: S,
    pub effect: Option<Effect>,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MachineState::Pending => "pending",
            MachineState::Starting => "starting",
            MachineState::Running => "running",
            MachineState::Stopping => "stopping",
            MachineState::Stopped => "stopped",
            MachineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainerState::NotFound => "not found",
            ContainerState::Creating => "creating",
            ContainerState::Running => "running",
            ContainerState::Stopping => "stopping",
            ContainerState::Stopped => "stopped",
            ContainerState::Failed => "failed",
        };
        f.write_str(s)
    }
}

fn transition<S>(next: S, effect: Option<Effect>) -> Result<Transition<S>> {
    Ok(Transition { next, effect })
}

fn illegal<S: fmt::Display, E: fmt::Debug>(from: S, event: E) -> anyhow::Error {
    anyhow!(DevmError::IllegalTransition {
        from: from.to_string(),
        event: format!("{event:?}"),
    })
}

/// Computes the machine transition for `(current, event)`.
///
/// Returns `IllegalTransition` for any pair outside the table above.
pub fn machine_transition(
    current: MachineState,
    event: MachineEvent,
) -> Result<Transition<MachineState>> {
    use MachineEvent as E;
    use MachineState as S;
    match (current, event) {
        (S::Pending | S::Stopped, E::StartRequested) => {
            transition(S::Starting, Some(Effect::StartMachine))
        }
        (S::Starting, E::ConfirmedRunning) => transition(S::Running, None),
        (S::Starting, E::StartTimedOut) => transition(S::Failed, None),
        (S::Running, E::StopRequested) => transition(S::Stopping, Some(Effect::StopMachine)),
        (S::Stopping, E::ConfirmedStopped) => transition(S::Stopped, None),
        // Unrecoverable remote errors sink every state into Failed.
        (_, E::RemoteFailed) => transition(S::Failed, None),
        (from, event) => Err(illegal(from, event)),
    }
}

/// Computes the container transition for `(current, event)`.
///
/// Returns `IllegalTransition` for any pair outside the table above.
pub fn container_transition(
    current: ContainerState,
    event: ContainerEvent,
) -> Result<Transition<ContainerState>> {
    use ContainerEvent as E;
    use ContainerState as S;
    match (current, event) {
        (S::NotFound | S::Stopped | S::Failed, E::StartRequested) => {
            transition(S::Creating, Some(Effect::StartContainer))
        }
        (S::Creating, E::ConfirmedRunning) => transition(S::Running, None),
        (S::Creating, E::StartFailed) => transition(S::Failed, None),
        (S::Running, E::StopRequested) => transition(S::Stopping, Some(Effect::StopContainer)),
        (S::Stopping, E::ConfirmedStopped) => transition(S::Stopped, None),
        (from, event) => Err(illegal(from, event)),
    }
}

/// Guard for the machine-before-container invariant: a container may only be
/// reserved for creation while its owning machine is locally Running or not
/// yet observed (Pending — the control plane is authoritative and answers
/// with the distinguished machine-not-started signal if the optimistic probe
/// was wrong). A machine locally known to be Starting also rejects here,
/// which keeps start operations to at most one in flight per machine.
pub fn may_reserve_create(machine: MachineState) -> bool {
    matches!(machine, MachineState::Pending | MachineState::Running)
}
