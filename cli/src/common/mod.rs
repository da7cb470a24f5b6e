//! # devm Shared Functionality (`common`)
//!
//! File: cli/src/common/mod.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Functionality shared across the command modules: machine and container
//! lifecycle coordination, token-based authentication, and interactive
//! session attach.
//!
pub mod attach;
pub mod auth;
pub mod machines;
