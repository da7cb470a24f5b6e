//! # devm Machine Lifecycle (`common::machines`)
//!
//! File: cli/src/common/machines/mod.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Everything between the CLI commands and the dev-machine control plane:
//! the lifecycle state machine, the in-memory registry cache, the transport
//! contract with its HTTP implementation, and the orchestration driver that
//! ties them together.
//!
//! ## Architecture
//!
//! - **`state`**: pure transition functions for machine and container
//!   lifecycles. No I/O; every legal transition and its side effect is
//!   decided here.
//! - **`registry`**: concurrent cache of lifecycle records, mutated through
//!   compare-and-swap.
//! - **`transport`** / **`http`**: the control-plane API seam and its
//!   authenticated `reqwest` implementation.
//! - **`driver`**: the use-case layer (`up`, `down`, `ps`, machine
//!   start/stop/status) that commands call into.
//!
pub mod driver;
pub mod http;
pub mod registry;
pub mod state;
pub mod transport;

pub use driver::{DriverSettings, LifecycleDriver, LifecycleRequest};
pub use http::HttpTransport;
pub use transport::MachineStatus;
