//! # devm Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components that provide
//! foundational functionality for devm: configuration, error management,
//! and input validation.
//!
//! ## Architecture
//!
//! - `config`: configuration loading, merging, and validation
//! - `error`: error taxonomy and handling utilities
//! - `validate`: pre-flight validation of container names and image refs
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config;
//! use crate::core::error::{DevmError, Result};
//! use crate::core::validate;
//! ```
//!
pub mod config;
pub mod error;
pub mod validate;
