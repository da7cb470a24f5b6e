//! # devm Configuration System
//!
//! File: cli/src/core/config.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! This module implements the configuration system for devm, handling
//! loading, merging, validation, and access to configuration data. It
//! combines defaults, user settings, and project-specific overrides.
//!
//! ## Architecture
//!
//! - Configuration is loaded from multiple sources in order of precedence
//! - Paths are expanded (e.g., `~` to home directory) after merging
//! - The merged configuration is validated before use
//! - The resulting `Config` struct is passed explicitly to the constructors
//!   that need it; there is no mutable process-wide singleton
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.devm.toml` in the current directory or ancestors
//!    (the search stops at a `.git` boundary)
//! 2. User-specific `~/.config/devm/config.toml`
//! 3. Default values defined in code
//!
//! ## Examples
//!
//! ```toml
//! [api]
//! url = "https://api.devm.dev"
//! timeout_secs = 30
//!
//! [machine]
//! region = "us-east-1"
//! size = "medium"
//! grace_secs = 3
//!
//! [ssh]
//! user = "root"
//! ```
//!
use crate::core::error::{DevmError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub machine: MachineConfig,
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Settings for the dev-machine control-plane API.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the control plane.
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Per-request timeout in seconds for control-plane calls.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

/// Defaults used when starting the machine that hosts containers.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct MachineConfig {
    /// Region the machine is started in.
    #[serde(default = "default_region")]
    pub region: String,
    /// Machine size/class.
    #[serde(default = "default_size")]
    pub size: String,
    /// Seconds to wait after requesting a machine start before retrying a
    /// dependent container start. Machine boot is asynchronous; an immediate
    /// retry would observe stale "not started" state. Placeholder value, not
    /// a tuned one.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
}

/// Settings for `devm ssh` / `devm mosh`.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SshConfig {
    /// Remote user the attach commands log in as.
    #[serde(default = "default_ssh_user")]
    pub user: String,
}

/// Authentication-related settings.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Override path of the cached token file (can use `~`). When unset, the
    /// platform data directory is used.
    pub token_file: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            size: default_size(),
            grace_secs: default_grace_secs(),
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: default_ssh_user(),
        }
    }
}

impl Config {
    /// Grace interval as a `Duration`, the form the driver consumes.
    pub fn grace_interval(&self) -> Duration {
        Duration::from_secs(self.machine.grace_secs)
    }

    /// Request timeout as a `Duration`.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

fn default_api_url() -> String {
    "https://api.devm.dev".to_string()
}
fn default_api_timeout_secs() -> u64 {
    30
}
fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_size() -> String {
    "medium".to_string()
}
fn default_grace_secs() -> u64 {
    3
}
fn default_ssh_user() -> String {
    "root".to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".devm.toml";

/// Loads, merges, expands and validates the effective configuration.
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

/// Returns the platform-specific project directories for devm, used for the
/// user config file and the default token cache location.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "devm", "devm")
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = project_dirs() {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path()? {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.devm.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path() -> Result<Option<PathBuf>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut path: &Path = &current_dir;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        let git_dir = path.join(".git");
        if project_config.exists() && project_config.is_file() {
            return Ok(Some(project_config));
        }
        if git_dir.exists() && git_dir.is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return Ok(None);
        }
        match path.parent() {
            Some(parent) => path = parent,
            None => break,
        }
    }
    Ok(None)
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Merges user and project configs; a project value wins when it differs
/// from the built-in default (i.e. was set explicitly).
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.api.url = if project_cfg.api.url != default_api_url() {
        project_cfg.api.url
    } else {
        user.api.url
    };
    merged.api.timeout_secs = if project_cfg.api.timeout_secs != default_api_timeout_secs() {
        project_cfg.api.timeout_secs
    } else {
        user.api.timeout_secs
    };
    merged.machine.region = if project_cfg.machine.region != default_region() {
        project_cfg.machine.region
    } else {
        user.machine.region
    };
    merged.machine.size = if project_cfg.machine.size != default_size() {
        project_cfg.machine.size
    } else {
        user.machine.size
    };
    merged.machine.grace_secs = if project_cfg.machine.grace_secs != default_grace_secs() {
        project_cfg.machine.grace_secs
    } else {
        user.machine.grace_secs
    };
    merged.ssh.user = if project_cfg.ssh.user != default_ssh_user() {
        project_cfg.ssh.user
    } else {
        user.ssh.user
    };
    merged.auth.token_file = project_cfg.auth.token_file.or(user.auth.token_file);
    merged
}

fn expand_config_paths(config: &mut Config) {
    if let Some(token_file) = &config.auth.token_file {
        let expanded = shellexpand::tilde(token_file).into_owned();
        debug!("Expanded token file path: {}", expanded);
        config.auth.token_file = Some(expanded);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.api.url.is_empty()
        || !(config.api.url.starts_with("http://") || config.api.url.starts_with("https://"))
    {
        return Err(anyhow!(DevmError::Config(format!(
            "Invalid API url '{}'. Expected an http(s) URL.",
            config.api.url
        ))));
    }
    if config.api.timeout_secs == 0 {
        return Err(anyhow!(DevmError::Config(
            "api.timeout_secs must be greater than zero.".to_string()
        )));
    }
    if config.machine.region.is_empty() {
        return Err(anyhow!(DevmError::Config(
            "machine.region must not be empty.".to_string()
        )));
    }
    if config.machine.size.is_empty() {
        return Err(anyhow!(DevmError::Config(
            "machine.size must not be empty.".to_string()
        )));
    }
    if config.ssh.user.is_empty() {
        return Err(anyhow!(DevmError::Config(
            "ssh.user must not be empty.".to_string()
        )));
    }
    info!("Configuration validation successful.");
    Ok(())
}
