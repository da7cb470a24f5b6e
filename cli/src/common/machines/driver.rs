//! # devm Orchestration Driver (`common::machines::driver`)
//!
//! File: cli/src/common/machines/driver.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! The use-case logic behind `devm up`, `devm down`, `devm ps` and the
//! `devm machine` group: given a container name and an optional image,
//! guarantee a running container on a running machine, with
//! at-most-one-machine-start and idempotent container-start semantics,
//! bounded waiting, and clear failure signaling.
//!
//! ## Architecture
//!
//! The driver owns three collaborators:
//! - a `RemoteTransport` (generic, so tests substitute doubles),
//! - the `Registry` cache, mutated only through compare-and-swap for state
//!   transitions, which is what serializes concurrent requests,
//! - the state machine engine, consulted before every remote call.
//!
//! `up` runs as one logical operation per request:
//! 1. Query the remote listing; an already-running container returns
//!    success immediately.
//! 2. Reserve the create by swapping the container record into Creating.
//!    A concurrent `up` for the same name loses this swap and observes
//!    `Conflict` ("already starting") instead of issuing a duplicate create.
//! 3. Start the container. On the distinguished `MachineNotStarted` signal,
//!    start the machine with the configured defaults, wait the grace
//!    interval (machine boot is asynchronous; an immediate retry would
//!    observe stale "not started" state), and retry the container start
//!    exactly once. A second failure surfaces unchanged — no unbounded
//!    retry loop that could mask a persistently broken machine.
//!
//! The driver performs blocking (awaited) calls to the transport; no
//! registry lock is ever held across an await point. Abandoning a pending
//! call does not cancel in-flight remote operations.
//!
use crate::common::machines::registry::{MachineRecord, Registry};
use crate::common::machines::state::{
    self, ContainerEvent, ContainerState, Effect, MachineEvent, MachineState,
};
use crate::common::machines::transport::{ContainerSummary, MachineStatus, RemoteTransport};
use crate::core::config::Config;
use crate::core::error::{is_kind, DevmError, Result};
use crate::core::validate;
use anyhow::anyhow;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// The control plane scopes one machine per account, so the cached record
/// lives under a single well-known id.
pub const DEFAULT_MACHINE_ID: &str = "default";

/// A validated request to bring a container up.
#[derive(Debug, Clone)]
pub struct LifecycleRequest {
    name: String,
    image: String,
}

impl LifecycleRequest {
    /// Validates the container name (and image, when given) before anything
    /// reaches the remote API. The image defaults to the container name.
    pub fn new(name: &str, image: Option<&str>) -> Result<Self> {
        validate::validate_container_name(name)?;
        let image = image.unwrap_or(name).to_string();
        validate::validate_image_reference(&image)?;
        Ok(Self {
            name: name.to_string(),
            image,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

/// Fixed parameters the driver starts machines with.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub machine_id: String,
    pub region: String,
    pub size: String,
    /// Grace interval between a machine start request and the dependent
    /// container-start retry.
    pub grace: Duration,
}

impl DriverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            machine_id: DEFAULT_MACHINE_ID.to_string(),
            region: config.machine.region.clone(),
            size: config.machine.size.clone(),
            grace: config.grace_interval(),
        }
    }
}

/// Coordinates machine and container lifecycle against the control plane.
#[derive(Debug)]
pub struct LifecycleDriver<T> {
    transport: T,
    registry: Registry,
    settings: DriverSettings,
}

impl<T: RemoteTransport> LifecycleDriver<T> {
    pub fn new(transport: T, settings: DriverSettings) -> Self {
        Self {
            transport,
            registry: Registry::new(),
            settings,
        }
    }

    /// Read access to the cache, for inspection and tests.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Ensures the container is running, bootstrapping the machine if the
    /// control plane reports it not started. Idempotent: an already-running
    /// container is a success without any create reaching the remote.
    #[instrument(skip(self, request), fields(container = %request.name))]
    pub async fn up(&self, request: &LifecycleRequest) -> Result<ContainerState> {
        let name = request.name();

        // Remote truth first.
        let listed = self.transport.list_containers().await?;
        let remote = listed.iter().find(|c| c.name == name).cloned();
        if let Some(summary) = &remote {
            if summary.state == ContainerState::Running {
                self.registry.settle_container(
                    name,
                    &summary.image,
                    &self.settings.machine_id,
                    summary.state,
                );
                info!("Container '{}' is already running.", name);
                return Ok(ContainerState::Running);
            }
        }

        // Reserve the create. The guard keeps container starts out while a
        // machine start is in flight, which bounds starts to one per machine.
        let machine = self.machine_record();
        if !state::may_reserve_create(machine.state) {
            return Err(anyhow!(DevmError::Conflict(format!(
                "machine '{}' is {}; cannot start container '{}' right now",
                machine.id, machine.state, name
            ))));
        }
        // The cached record outranks the listing we took above: the listing
        // may predate a concurrent create that has since completed, and
        // re-settling from it here would undo that create's record.
        let observed = remote.as_ref().map(|c| c.state).unwrap_or(ContainerState::NotFound);
        let current = match self.registry.container(name) {
            Some(record) => record.state,
            None => self.registry.settle_container(
                name,
                remote.as_ref().map(|c| c.image.as_str()).unwrap_or(request.image()),
                &self.settings.machine_id,
                observed,
            ),
        };
        match current {
            // A concurrent request finished the create between our listing
            // and now.
            ContainerState::Running => {
                info!("Container '{}' is already running.", name);
                return Ok(ContainerState::Running);
            }
            ContainerState::Creating | ContainerState::Stopping => {
                return Err(anyhow!(DevmError::Conflict(format!(
                    "container '{}' is already {}",
                    name, current
                ))));
            }
            _ => {}
        }
        let reserved = state::container_transition(current, ContainerEvent::StartRequested)?;
        debug_assert_eq!(reserved.effect, Some(Effect::StartContainer));
        // Losing this swap means a concurrent request won the race.
        self.registry
            .compare_and_swap_container_state(name, current, reserved.next)?;

        // Single-shot start, with one machine-bootstrap retry.
        match self.transport.start_container(name, request.image()).await {
            Ok(summary) => self.finish_create(name, &summary),
            Err(e) if is_kind(&e, |de| matches!(de, DevmError::MachineNotStarted)) => {
                info!("Machine is not started; bootstrapping it before one retry.");
                if let Err(boot_err) = self.bootstrap_machine().await {
                    self.fail_create(name);
                    return Err(boot_err);
                }
                match self.transport.start_container(name, request.image()).await {
                    Ok(summary) => {
                        self.confirm_machine_running();
                        self.finish_create(name, &summary)
                    }
                    Err(retry_err) => {
                        // Bounded: exactly one retry, then surface the error.
                        self.expire_machine_start();
                        self.fail_create(name);
                        Err(retry_err)
                    }
                }
            }
            Err(e) => {
                self.fail_create(name);
                Err(e)
            }
        }
    }

    /// Stops the container by name. Fails with `NotFound` (registry
    /// untouched) when the name is unknown to the control plane.
    #[instrument(skip(self), fields(container = %name))]
    pub async fn down(&self, name: &str) -> Result<ContainerState> {
        let summary = self.transport.stop_container(name).await?;
        if let Some(record) = self.registry.container(name) {
            if record.state == ContainerState::Running {
                // The remote stop already completed; walk the cache through
                // the same two steps it models.
                if let Ok(t) =
                    state::container_transition(record.state, ContainerEvent::StopRequested)
                {
                    if self
                        .registry
                        .compare_and_swap_container_state(name, record.state, t.next)
                        .is_ok()
                    {
                        if let Ok(done) = state::container_transition(
                            t.next,
                            ContainerEvent::ConfirmedStopped,
                        ) {
                            let _ = self
                                .registry
                                .compare_and_swap_container_state(name, t.next, done.next);
                        }
                    }
                }
            }
        }
        info!("Container '{}' is {}.", name, summary.state);
        Ok(summary.state)
    }

    /// Lists containers in remote-reported order. An empty listing is a
    /// valid, non-error result.
    #[instrument(skip(self))]
    pub async fn ps(&self) -> Result<Vec<ContainerSummary>> {
        let containers = self.transport.list_containers().await?;
        for c in &containers {
            self.registry
                .settle_container(&c.name, &c.image, &self.settings.machine_id, c.state);
        }
        Ok(containers)
    }

    /// Starts the machine with the configured region and size.
    #[instrument(skip(self))]
    pub async fn start_machine(&self) -> Result<MachineStatus> {
        let machine = self.machine_record();
        let t = state::machine_transition(machine.state, MachineEvent::StartRequested)?;
        debug_assert_eq!(t.effect, Some(Effect::StartMachine));
        self.registry
            .compare_and_swap_machine_state(&machine.id, machine.state, t.next)?;
        match self
            .transport
            .start_machine(&self.settings.region, &self.settings.size)
            .await
        {
            Ok(status) => {
                if status.state == MachineState::Running {
                    self.confirm_machine_running();
                }
                Ok(status)
            }
            Err(e) => {
                self.mark_machine_failed();
                Err(e)
            }
        }
    }

    /// Stops the machine; a machine that is not running is a no-op.
    #[instrument(skip(self))]
    pub async fn stop_machine(&self) -> Result<MachineStatus> {
        let status = self.transport.machine_status().await?;
        let machine = self.machine_record();
        if status.state != MachineState::Running {
            let current = self.registry.settle_machine(&machine.id, status.state);
            info!("Machine is {}; nothing to stop.", current);
            return Ok(status);
        }
        // An explicit stop follows remote truth: a record still parked in
        // Starting from an unconfirmed boot is refreshed to Running before
        // the engine is consulted, rather than blocking the stop.
        self.registry.upsert_machine(MachineRecord {
            state: MachineState::Running,
            ..machine.clone()
        });
        let t = state::machine_transition(MachineState::Running, MachineEvent::StopRequested)?;
        debug_assert_eq!(t.effect, Some(Effect::StopMachine));
        self.registry
            .compare_and_swap_machine_state(&machine.id, MachineState::Running, t.next)?;
        match self.transport.stop_machine().await {
            Ok(status) => {
                if let Ok(done) =
                    state::machine_transition(MachineState::Stopping, MachineEvent::ConfirmedStopped)
                {
                    let _ = self.registry.compare_and_swap_machine_state(
                        &machine.id,
                        MachineState::Stopping,
                        done.next,
                    );
                }
                Ok(status)
            }
            Err(e) => {
                if let Ok(failed) =
                    state::machine_transition(MachineState::Stopping, MachineEvent::RemoteFailed)
                {
                    let _ = self.registry.compare_and_swap_machine_state(
                        &machine.id,
                        MachineState::Stopping,
                        failed.next,
                    );
                }
                Err(e)
            }
        }
    }

    /// Remote-reported machine status; refreshes the cache.
    #[instrument(skip(self))]
    pub async fn machine_status(&self) -> Result<MachineStatus> {
        let status = self.transport.machine_status().await?;
        let machine = self.machine_record();
        self.registry.settle_machine(&machine.id, status.state);
        Ok(status)
    }

    /// Reachable address of the machine, for SSH/MOSH attach.
    pub async fn machine_ip(&self) -> Result<String> {
        self.transport.machine_ip().await
    }

    /// Returns the cached machine record, creating it on first reference.
    fn machine_record(&self) -> MachineRecord {
        if let Some(record) = self.registry.machine(&self.settings.machine_id) {
            return record;
        }
        let record = MachineRecord {
            id: self.settings.machine_id.clone(),
            region: self.settings.region.clone(),
            size: self.settings.size.clone(),
            state: MachineState::Pending,
        };
        self.registry.upsert_machine(record.clone());
        record
    }

    /// Machine bootstrap: request the start, wait the grace interval, probe
    /// once for confirmation. An inconclusive probe leaves the record
    /// Starting; the container retry's outcome settles it.
    async fn bootstrap_machine(&self) -> Result<()> {
        let machine = self.machine_record();
        // The control plane just told us the machine is down; settle a stale
        // Running/Failed cache entry before asking the engine.
        let current = self.registry.settle_machine(&machine.id, MachineState::Stopped);
        let t = state::machine_transition(current, MachineEvent::StartRequested)?;
        debug_assert_eq!(t.effect, Some(Effect::StartMachine));
        self.registry
            .compare_and_swap_machine_state(&machine.id, current, t.next)?;

        info!(
            "Starting machine '{}' (region {}, size {})...",
            machine.id, self.settings.region, self.settings.size
        );
        if let Err(e) = self
            .transport
            .start_machine(&self.settings.region, &self.settings.size)
            .await
        {
            self.mark_machine_failed();
            return Err(e);
        }

        debug!(
            "Waiting {:?} before retrying the dependent container start.",
            self.settings.grace
        );
        tokio::time::sleep(self.settings.grace).await;

        match self.transport.machine_status().await {
            Ok(status) if status.state == MachineState::Running => self.confirm_machine_running(),
            Ok(status) => warn!("Machine still {} after the grace interval.", status.state),
            Err(e) => warn!("Machine status probe failed: {e:#}"),
        }
        Ok(())
    }

    fn finish_create(&self, name: &str, summary: &ContainerSummary) -> Result<ContainerState> {
        let t = state::container_transition(ContainerState::Creating, ContainerEvent::ConfirmedRunning)?;
        self.registry
            .compare_and_swap_container_state(name, ContainerState::Creating, t.next)?;
        info!("Container '{}' is {}.", name, summary.state);
        Ok(summary.state)
    }

    /// Records a terminal create failure. Best effort: a lost swap only
    /// means the cache is stale, and the next `up` settles it from remote
    /// truth.
    fn fail_create(&self, name: &str) {
        if let Ok(t) =
            state::container_transition(ContainerState::Creating, ContainerEvent::StartFailed)
        {
            let _ = self
                .registry
                .compare_and_swap_container_state(name, ContainerState::Creating, t.next);
        }
    }

    fn confirm_machine_running(&self) {
        if let Ok(t) =
            state::machine_transition(MachineState::Starting, MachineEvent::ConfirmedRunning)
        {
            let _ = self.registry.compare_and_swap_machine_state(
                &self.settings.machine_id,
                MachineState::Starting,
                t.next,
            );
        }
    }

    fn expire_machine_start(&self) {
        if let Ok(t) =
            state::machine_transition(MachineState::Starting, MachineEvent::StartTimedOut)
        {
            let _ = self.registry.compare_and_swap_machine_state(
                &self.settings.machine_id,
                MachineState::Starting,
                t.next,
            );
        }
    }

    fn mark_machine_failed(&self) {
        if let Ok(t) = state::machine_transition(MachineState::Starting, MachineEvent::RemoteFailed)
        {
            let _ = self.registry.compare_and_swap_machine_state(
                &self.settings.machine_id,
                MachineState::Starting,
                t.next,
            );
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted, counting transport double.
    #[derive(Debug, Default)]
    struct FakeState {
        listed: Vec<ContainerSummary>,
        machine_running: bool,
        /// When false, `start_machine` is accepted but never takes effect,
        /// simulating a persistently broken machine.
        machine_start_effective: bool,
        start_container_calls: usize,
        start_machine_calls: usize,
    }

    #[derive(Debug, Clone, Default)]
    struct FakeTransport {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeTransport {
        fn with_machine_running() -> Self {
            let fake = Self::default();
            fake.state.lock().unwrap().machine_running = true;
            fake
        }

        fn with_bootable_machine() -> Self {
            let fake = Self::default();
            fake.state.lock().unwrap().machine_start_effective = true;
            fake
        }

        fn add_running_container(&self, name: &str) {
            self.state.lock().unwrap().listed.push(ContainerSummary {
                name: name.to_string(),
                image: name.to_string(),
                state: ContainerState::Running,
            });
        }

        fn start_container_calls(&self) -> usize {
            self.state.lock().unwrap().start_container_calls
        }

        fn start_machine_calls(&self) -> usize {
            self.state.lock().unwrap().start_machine_calls
        }

        fn machine_status_value(running: bool) -> MachineStatus {
            MachineStatus {
                id: DEFAULT_MACHINE_ID.to_string(),
                state: if running {
                    MachineState::Running
                } else {
                    MachineState::Stopped
                },
                region: Some("us-east-1".to_string()),
                size: Some("medium".to_string()),
                ip: Some("203.0.113.7".to_string()),
            }
        }
    }

    impl RemoteTransport for FakeTransport {
        async fn start_machine(&self, _region: &str, _size: &str) -> Result<MachineStatus> {
            let mut s = self.state.lock().unwrap();
            s.start_machine_calls += 1;
            if s.machine_start_effective {
                s.machine_running = true;
            }
            Ok(MachineStatus {
                // Boot is asynchronous: the start call itself reports Starting.
                state: MachineState::Starting,
                ..Self::machine_status_value(false)
            })
        }

        async fn stop_machine(&self) -> Result<MachineStatus> {
            let mut s = self.state.lock().unwrap();
            s.machine_running = false;
            Ok(Self::machine_status_value(false))
        }

        async fn machine_status(&self) -> Result<MachineStatus> {
            let s = self.state.lock().unwrap();
            Ok(Self::machine_status_value(s.machine_running))
        }

        async fn machine_ip(&self) -> Result<String> {
            Ok("203.0.113.7".to_string())
        }

        async fn start_container(&self, name: &str, image: &str) -> Result<ContainerSummary> {
            let mut s = self.state.lock().unwrap();
            s.start_container_calls += 1;
            if !s.machine_running {
                return Err(anyhow!(DevmError::MachineNotStarted));
            }
            let summary = ContainerSummary {
                name: name.to_string(),
                image: image.to_string(),
                state: ContainerState::Running,
            };
            s.listed.push(summary.clone());
            Ok(summary)
        }

        async fn stop_container(&self, name: &str) -> Result<ContainerSummary> {
            let mut s = self.state.lock().unwrap();
            match s.listed.iter().position(|c| c.name == name) {
                Some(pos) => {
                    let mut summary = s.listed.remove(pos);
                    summary.state = ContainerState::Stopped;
                    Ok(summary)
                }
                None => Err(anyhow!(DevmError::NotFound {
                    name: name.to_string()
                })),
            }
        }

        async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
            Ok(self.state.lock().unwrap().listed.clone())
        }
    }

    fn settings() -> DriverSettings {
        DriverSettings {
            machine_id: DEFAULT_MACHINE_ID.to_string(),
            region: "us-east-1".to_string(),
            size: "medium".to_string(),
            grace: Duration::from_secs(3),
        }
    }

    fn driver(transport: FakeTransport) -> LifecycleDriver<FakeTransport> {
        LifecycleDriver::new(transport, settings())
    }

    #[test]
    fn test_request_defaults_image_to_name() {
        let request = LifecycleRequest::new("webdev", None).unwrap();
        assert_eq!(request.name(), "webdev");
        assert_eq!(request.image(), "webdev");

        let request = LifecycleRequest::new("webdev", Some("ubuntu:24.04")).unwrap();
        assert_eq!(request.image(), "ubuntu:24.04");

        assert!(LifecycleRequest::new("Bad Name", None).is_err());
        assert!(LifecycleRequest::new("webdev", Some("bad image")).is_err());
    }

    #[tokio::test]
    async fn test_up_starts_container_on_running_machine() {
        let fake = FakeTransport::with_machine_running();
        let driver = driver(fake.clone());
        let request = LifecycleRequest::new("webdev", None).unwrap();

        let state = driver.up(&request).await.unwrap();
        assert_eq!(state, ContainerState::Running);
        assert_eq!(fake.start_container_calls(), 1);
        assert_eq!(fake.start_machine_calls(), 0);
        assert_eq!(
            driver.registry().container("webdev").unwrap().state,
            ContainerState::Running
        );
    }

    #[tokio::test]
    async fn test_up_is_idempotent_for_running_container() {
        let fake = FakeTransport::with_machine_running();
        fake.add_running_container("webdev");
        let driver = driver(fake.clone());
        let request = LifecycleRequest::new("webdev", None).unwrap();

        assert_eq!(driver.up(&request).await.unwrap(), ContainerState::Running);
        assert_eq!(driver.up(&request).await.unwrap(), ContainerState::Running);
        // No create ever reached the transport.
        assert_eq!(fake.start_container_calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_up_issues_exactly_one_create() {
        let fake = FakeTransport::with_machine_running();
        let driver = Arc::new(driver(fake.clone()));
        let request = LifecycleRequest::new("webdev", None).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let driver = Arc::clone(&driver);
            let request = request.clone();
            handles.push(tokio::spawn(async move { driver.up(&request).await }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(state) => {
                    assert_eq!(state, ContainerState::Running);
                    successes += 1;
                }
                Err(e) => {
                    assert!(
                        is_kind(&e, |de| matches!(de, DevmError::Conflict(_))),
                        "unexpected error: {e:#}"
                    );
                    conflicts += 1;
                }
            }
        }

        assert_eq!(fake.start_container_calls(), 1);
        assert!(successes >= 1);
        assert_eq!(successes + conflicts, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_up_bootstraps_machine_then_retries_once() {
        let fake = FakeTransport::with_bootable_machine();
        let driver = driver(fake.clone());
        let request = LifecycleRequest::new("webdev", None).unwrap();

        let before = tokio::time::Instant::now();
        let state = driver.up(&request).await.unwrap();

        assert_eq!(state, ContainerState::Running);
        // First attempt, machine bootstrap, exactly one retry.
        assert_eq!(fake.start_container_calls(), 2);
        assert_eq!(fake.start_machine_calls(), 1);
        // The retry only happened after the grace interval elapsed.
        assert!(before.elapsed() >= Duration::from_secs(3));
        assert_eq!(
            driver.registry().machine(DEFAULT_MACHINE_ID).unwrap().state,
            MachineState::Running
        );
        assert_eq!(
            driver.registry().container("webdev").unwrap().state,
            ContainerState::Running
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_up_retry_is_bounded() {
        // start_machine is accepted but never takes effect.
        let fake = FakeTransport::default();
        let driver = driver(fake.clone());
        let request = LifecycleRequest::new("webdev", None).unwrap();

        let err = driver.up(&request).await.unwrap_err();
        assert!(is_kind(&err, |de| matches!(de, DevmError::MachineNotStarted)));
        // Two container attempts, one machine start — then give up.
        assert_eq!(fake.start_container_calls(), 2);
        assert_eq!(fake.start_machine_calls(), 1);
        assert_eq!(
            driver.registry().container("webdev").unwrap().state,
            ContainerState::Failed
        );
        assert_eq!(
            driver.registry().machine(DEFAULT_MACHINE_ID).unwrap().state,
            MachineState::Failed
        );
    }

    #[tokio::test]
    async fn test_ps_empty_listing_is_ok() {
        let driver = driver(FakeTransport::default());
        let listed = driver.ps().await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_ps_preserves_remote_order() {
        let fake = FakeTransport::with_machine_running();
        fake.add_running_container("bravo");
        fake.add_running_container("alpha");
        let driver = driver(fake);
        let listed = driver.ps().await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["bravo", "alpha"]);
    }

    #[tokio::test]
    async fn test_down_unknown_name_is_not_found_and_registry_unchanged() {
        let driver = driver(FakeTransport::with_machine_running());
        let err = driver.down("ghost").await.unwrap_err();
        assert!(is_kind(&err, |de| matches!(de, DevmError::NotFound { .. })));
        assert_eq!(driver.registry().container_count(), 0);
    }

    #[tokio::test]
    async fn test_down_running_container() {
        let fake = FakeTransport::with_machine_running();
        let driver = driver(fake.clone());
        let request = LifecycleRequest::new("webdev", None).unwrap();
        driver.up(&request).await.unwrap();

        let state = driver.down("webdev").await.unwrap();
        assert_eq!(state, ContainerState::Stopped);
        assert_eq!(
            driver.registry().container("webdev").unwrap().state,
            ContainerState::Stopped
        );
        // Stopped containers can be brought back up.
        let state = driver.up(&request).await.unwrap();
        assert_eq!(state, ContainerState::Running);
    }

    #[tokio::test]
    async fn test_machine_start_stop_round_trip() {
        let fake = FakeTransport::with_bootable_machine();
        let driver = driver(fake.clone());

        let status = driver.start_machine().await.unwrap();
        assert_eq!(status.state, MachineState::Starting);
        assert_eq!(fake.start_machine_calls(), 1);

        // The fake's machine is now up; stop takes it down again.
        let status = driver.stop_machine().await.unwrap();
        assert_eq!(status.state, MachineState::Stopped);
        assert_eq!(
            driver.registry().machine(DEFAULT_MACHINE_ID).unwrap().state,
            MachineState::Stopped
        );
    }

    #[tokio::test]
    async fn test_stop_machine_is_noop_when_not_running() {
        let fake = FakeTransport::default();
        let driver = driver(fake);
        let status = driver.stop_machine().await.unwrap();
        assert_eq!(status.state, MachineState::Stopped);
    }
}
