//! # devm Token Provider (`common::auth`)
//!
//! File: cli/src/common/auth/mod.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Supplies the bearer token that authorizes control-plane calls. Obtaining
//! and refreshing the token is the job of an external OAuth device/PKCE
//! login flow; this module only *reads* the cached result. The one contract
//! the coordinator needs is `current_token()`, failing with
//! `DevmError::AuthRequired` when no usable token exists.
//!
//! ## Architecture
//!
//! The cached token lives in a small JSON file (`access_token` +
//! `expires_at` as RFC 3339), by default under the platform data directory,
//! overridable via `[auth] token_file`. Expiry is checked with a small
//! clock-skew allowance so a token about to lapse mid-request is treated as
//! already expired.
//!
use crate::core::config::{self, Config};
use crate::core::error::{DevmError, Result};
use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Seconds of clock skew tolerated when judging token expiry.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Supplies a bearer token for control-plane requests.
pub trait TokenProvider {
    /// Returns the current token, or `DevmError::AuthRequired` when the
    /// token is missing, unreadable, or expired.
    fn current_token(&self) -> Result<String>;
}

/// Cached token file contents.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// A token is usable while its expiry (minus skew) lies in the future.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_SKEW_SECS) > now
    }
}

/// Token provider backed by the cached token file written by the login flow.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolves the token file location from the configuration, falling
    /// back to the platform data directory.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        if let Some(path) = &cfg.auth.token_file {
            return Ok(Self::new(PathBuf::from(path)));
        }
        let dirs = config::project_dirs().ok_or_else(|| {
            anyhow!(DevmError::Config(
                "Could not determine the platform data directory for the token cache.".to_string()
            ))
        })?;
        Ok(Self::new(dirs.data_dir().join("token.json")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read(&self) -> Result<CachedToken> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            debug!("Token file {} unreadable: {}", self.path.display(), e);
            anyhow!(DevmError::AuthRequired)
        })?;
        serde_json::from_str(&content).map_err(|e| {
            debug!("Token file {} malformed: {}", self.path.display(), e);
            anyhow!(DevmError::AuthRequired)
        })
    }
}

impl TokenProvider for FileTokenProvider {
    fn current_token(&self) -> Result<String> {
        let cached = self.read()?;
        if !cached.is_valid_at(Utc::now()) {
            debug!(
                "Cached token expired at {} (skew {}s)",
                cached.expires_at, EXPIRY_SKEW_SECS
            );
            return Err(anyhow!(DevmError::AuthRequired));
        }
        Ok(cached.access_token)
    }
}
