//! # devm Remote Transport Contract (`common::machines::transport`)
//!
//! File: cli/src/common/machines/transport.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! The `RemoteTransport` trait is the seam between the lifecycle coordinator
//! and the dev-machine control plane. The orchestration driver is generic
//! over it, so tests substitute counting/scripted doubles while production
//! code uses the authenticated HTTP client in `http.rs`.
//!
//! All operations are single-shot, authenticated calls; retry policy lives
//! in the driver, not here. Errors map into the `DevmError` taxonomy — in
//! particular the distinguished `MachineNotStarted` signal that triggers the
//! driver's machine bootstrap path.
//!
use crate::common::machines::state::{ContainerState, MachineState};
use crate::core::error::Result;
use serde::{Deserialize, Serialize};

/// Remote-reported machine status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineStatus {
    pub id: String,
    pub state: MachineState,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

/// Remote-reported container summary, as returned by list/start/stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    pub image: String,
    pub state: ContainerState,
}

/// Contract for the control-plane API.
///
/// `list_containers` preserves the remote-reported order; an empty listing
/// is a valid, non-error result.
#[allow(async_fn_in_trait)]
pub trait RemoteTransport {
    async fn start_machine(&self, region: &str, size: &str) -> Result<MachineStatus>;
    async fn stop_machine(&self) -> Result<MachineStatus>;
    async fn machine_status(&self) -> Result<MachineStatus>;
    async fn machine_ip(&self) -> Result<String>;
    async fn start_container(&self, name: &str, image: &str) -> Result<ContainerSummary>;
    async fn stop_container(&self, name: &str) -> Result<ContainerSummary>;
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>>;
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_types_deserialize() {
        let status: MachineStatus = serde_json::from_str(
            r#"{"id":"m-1","state":"running","region":"us-east-1","ip":"203.0.113.7"}"#,
        )
        .unwrap();
        assert_eq!(status.state, MachineState::Running);
        assert_eq!(status.ip.as_deref(), Some("203.0.113.7"));
        assert!(status.size.is_none());

        let summary: ContainerSummary =
            serde_json::from_str(r#"{"name":"webdev","image":"ubuntu","state":"creating"}"#)
                .unwrap();
        assert_eq!(summary.state, ContainerState::Creating);
    }
}
