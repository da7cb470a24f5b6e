//! # devm Resource Registry (`common::machines::registry`)
//!
//! File: cli/src/common/machines/registry.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! In-memory mapping of machine and container identities to lifecycle state.
//! The registry is a *cache* of remote-authoritative state: records are
//! created on first reference and never destroyed locally.
//!
//! ## Architecture
//!
//! Compare-and-swap is the sole mutation path for state transitions. A CAS
//! that loses its precondition fails with `DevmError::Conflict` and the
//! caller must re-read and retry or abort; this is what linearizes
//! concurrent start requests for the same container name. `upsert_*` exists
//! for record creation and for refreshing settled records from remote truth,
//! never for moving a record through its lifecycle.
//!
//! Locks are plain `std::sync::Mutex` guards, taken only inside the short,
//! synchronous methods here — never held across an await point.
//!
use crate::core::error::{DevmError, Result};
use crate::common::machines::state::{ContainerState, MachineState};
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::Mutex;

/// Cached record of the remote machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineRecord {
    pub id: String,
    pub region: String,
    pub size: String,
    pub state: MachineState,
}

/// Cached record of a container. `machine_id` is a back-reference to the
/// owning machine, not ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    pub machine_id: String,
    pub state: ContainerState,
}

/// In-memory registry of machine and container records.
#[derive(Debug, Default)]
pub struct Registry {
    machines: Mutex<HashMap<String, MachineRecord>>,
    containers: Mutex<HashMap<String, ContainerRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the machine record, if present.
    pub fn machine(&self, id: &str) -> Option<MachineRecord> {
        self.machines
            .lock()
            .expect("registry mutex poisoned")
            .get(id)
            .cloned()
    }

    /// Returns a snapshot of the container record, if present.
    pub fn container(&self, name: &str) -> Option<ContainerRecord> {
        self.containers
            .lock()
            .expect("registry mutex poisoned")
            .get(name)
            .cloned()
    }

    /// Inserts or replaces a machine record.
    pub fn upsert_machine(&self, record: MachineRecord) {
        self.machines
            .lock()
            .expect("registry mutex poisoned")
            .insert(record.id.clone(), record);
    }

    /// Inserts or replaces a container record.
    pub fn upsert_container(&self, record: ContainerRecord) {
        self.containers
            .lock()
            .expect("registry mutex poisoned")
            .insert(record.name.clone(), record);
    }

    /// Atomically moves the machine `id` from `expected` to `next`.
    ///
    /// # Errors
    ///
    /// * `DevmError::MachineNotFound` when `id` is absent.
    /// * `DevmError::Conflict` when the current state no longer matches
    ///   `expected` (a concurrent mutation won the race).
    pub fn compare_and_swap_machine_state(
        &self,
        id: &str,
        expected: MachineState,
        next: MachineState,
    ) -> Result<()> {
        let mut machines = self.machines.lock().expect("registry mutex poisoned");
        let record = machines
            .get_mut(id)
            .ok_or_else(|| anyhow!(DevmError::MachineNotFound))?;
        if record.state != expected {
            return Err(anyhow!(DevmError::Conflict(format!(
                "machine '{}' is {}, expected {}",
                id, record.state, expected
            ))));
        }
        record.state = next;
        Ok(())
    }

    /// Atomically moves the container `name` from `expected` to `next`.
    ///
    /// # Errors
    ///
    /// * `DevmError::NotFound` when `name` is absent.
    /// * `DevmError::Conflict` when the current state no longer matches
    ///   `expected`.
    pub fn compare_and_swap_container_state(
        &self,
        name: &str,
        expected: ContainerState,
        next: ContainerState,
    ) -> Result<()> {
        let mut containers = self.containers.lock().expect("registry mutex poisoned");
        let record = containers.get_mut(name).ok_or_else(|| {
            anyhow!(DevmError::NotFound {
                name: name.to_string()
            })
        })?;
        if record.state != expected {
            return Err(anyhow!(DevmError::Conflict(format!(
                "container '{}' is {}, expected {}",
                name, record.state, expected
            ))));
        }
        record.state = next;
        Ok(())
    }

    /// Refreshes the cached container state from remote truth, unless an
    /// in-flight local state (Creating/Stopping) holds the record — those
    /// belong to an operation serialized through CAS and must not be
    /// clobbered by a concurrent read-back. Returns the resulting state.
    pub fn settle_container(
        &self,
        name: &str,
        image: &str,
        machine_id: &str,
        observed: ContainerState,
    ) -> ContainerState {
        let mut containers = self.containers.lock().expect("registry mutex poisoned");
        match containers.get_mut(name) {
            Some(record)
                if matches!(
                    record.state,
                    ContainerState::Creating | ContainerState::Stopping
                ) =>
            {
                record.state
            }
            Some(record) => {
                record.state = observed;
                record.image = image.to_string();
                observed
            }
            None => {
                containers.insert(
                    name.to_string(),
                    ContainerRecord {
                        name: name.to_string(),
                        image: image.to_string(),
                        machine_id: machine_id.to_string(),
                        state: observed,
                    },
                );
                observed
            }
        }
    }

    /// Machine counterpart of [`Self::settle_container`]: in-flight
    /// Starting/Stopping records win over the observed state.
    pub fn settle_machine(&self, id: &str, observed: MachineState) -> MachineState {
        let mut machines = self.machines.lock().expect("registry mutex poisoned");
        match machines.get_mut(id) {
            Some(record)
                if matches!(
                    record.state,
                    MachineState::Starting | MachineState::Stopping
                ) =>
            {
                record.state
            }
            Some(record) => {
                record.state = observed;
                observed
            }
            None => observed,
        }
    }

    /// Number of container records held (diagnostics and tests).
    pub fn container_count(&self) -> usize {
        self.containers
            .lock()
            .expect("registry mutex poisoned")
            .len()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::is_kind;

    fn container(name: &str, state: ContainerState) -> ContainerRecord {
        ContainerRecord {
            name: name.to_string(),
            image: name.to_string(),
            machine_id: "default".to_string(),
            state,
        }
    }

    #[test]
    fn test_get_absent_returns_none() {
        let registry = Registry::new();
        assert!(registry.machine("default").is_none());
        assert!(registry.container("webdev").is_none());
        assert_eq!(registry.container_count(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let registry = Registry::new();
        registry.upsert_container(container("webdev", ContainerState::NotFound));
        let record = registry.container("webdev").unwrap();
        assert_eq!(record.state, ContainerState::NotFound);
        assert_eq!(record.image, "webdev");
    }

    #[test]
    fn test_cas_success_and_conflict() {
        let registry = Registry::new();
        registry.upsert_container(container("webdev", ContainerState::NotFound));

        registry
            .compare_and_swap_container_state(
                "webdev",
                ContainerState::NotFound,
                ContainerState::Creating,
            )
            .unwrap();
        assert_eq!(
            registry.container("webdev").unwrap().state,
            ContainerState::Creating
        );

        // Same precondition again: the first swap already consumed it.
        let err = registry
            .compare_and_swap_container_state(
                "webdev",
                ContainerState::NotFound,
                ContainerState::Creating,
            )
            .unwrap_err();
        assert!(is_kind(&err, |de| matches!(de, DevmError::Conflict(_))));
        // Losing the race mutates nothing.
        assert_eq!(
            registry.container("webdev").unwrap().state,
            ContainerState::Creating
        );
    }

    #[test]
    fn test_cas_absent_is_not_found() {
        let registry = Registry::new();
        let err = registry
            .compare_and_swap_container_state(
                "ghost",
                ContainerState::NotFound,
                ContainerState::Creating,
            )
            .unwrap_err();
        assert!(is_kind(&err, |de| matches!(de, DevmError::NotFound { .. })));

        let err = registry
            .compare_and_swap_machine_state(
                "default",
                MachineState::Pending,
                MachineState::Starting,
            )
            .unwrap_err();
        assert!(is_kind(&err, |de| matches!(de, DevmError::MachineNotFound)));
    }

    #[test]
    fn test_settle_respects_in_flight_states() {
        let registry = Registry::new();
        registry.upsert_container(container("webdev", ContainerState::Creating));

        // A remote read-back must not clobber an in-flight create.
        let state =
            registry.settle_container("webdev", "ubuntu", "default", ContainerState::NotFound);
        assert_eq!(state, ContainerState::Creating);
        assert_eq!(
            registry.container("webdev").unwrap().state,
            ContainerState::Creating
        );

        // Settled records do follow remote truth.
        registry.upsert_container(container("idle", ContainerState::Running));
        let state =
            registry.settle_container("idle", "ubuntu", "default", ContainerState::NotFound);
        assert_eq!(state, ContainerState::NotFound);

        // Unknown records are created from the observation.
        let state =
            registry.settle_container("fresh", "ubuntu", "default", ContainerState::Running);
        assert_eq!(state, ContainerState::Running);
        assert_eq!(
            registry.container("fresh").unwrap().state,
            ContainerState::Running
        );
    }

    #[test]
    fn test_settle_machine() {
        let registry = Registry::new();
        // No record: the observation is returned but nothing is created.
        assert_eq!(
            registry.settle_machine("default", MachineState::Stopped),
            MachineState::Stopped
        );
        assert!(registry.machine("default").is_none());

        registry.upsert_machine(MachineRecord {
            id: "default".into(),
            region: "us-east-1".into(),
            size: "medium".into(),
            state: MachineState::Starting,
        });
        // In-flight start wins over a stale observation.
        assert_eq!(
            registry.settle_machine("default", MachineState::Stopped),
            MachineState::Starting
        );
    }

    #[test]
    fn test_machine_cas_round_trip() {
        let registry = Registry::new();
        registry.upsert_machine(MachineRecord {
            id: "default".into(),
            region: "us-east-1".into(),
            size: "medium".into(),
            state: MachineState::Pending,
        });
        registry
            .compare_and_swap_machine_state(
                "default",
                MachineState::Pending,
                MachineState::Starting,
            )
            .unwrap();
        registry
            .compare_and_swap_machine_state(
                "default",
                MachineState::Starting,
                MachineState::Running,
            )
            .unwrap();
        assert_eq!(
            registry.machine("default").unwrap().state,
            MachineState::Running
        );
    }
}
