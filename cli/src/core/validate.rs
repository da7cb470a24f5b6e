//! # devm Input Validation
//!
//! File: cli/src/core/validate.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Pre-flight validation for user-supplied identifiers. Invalid names and
//! image references are rejected here, before any remote call is issued, so
//! bad input fails fast and cheaply with a `DevmError::Validation`.
//!
//! Container names follow a DNS-label style rule: lowercase alphanumeric
//! plus `-`, starting with a letter, at most 63 characters. Image references
//! additionally allow `.`, `_`, `/` and `:` for registries and tags.
//!
use crate::core::error::{DevmError, Result};
use anyhow::anyhow;

/// Maximum length of a container name (DNS label limit).
pub const MAX_CONTAINER_NAME_LEN: usize = 63;

/// Maximum length of an image reference.
pub const MAX_IMAGE_REF_LEN: usize = 255;

/// Validates a container name against the allowed charset/length rule.
pub fn validate_container_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!(DevmError::Validation(
            "Container name must not be empty.".to_string()
        )));
    }
    if name.len() > MAX_CONTAINER_NAME_LEN {
        return Err(anyhow!(DevmError::Validation(format!(
            "Container name '{}' exceeds {} characters.",
            name, MAX_CONTAINER_NAME_LEN
        ))));
    }
    let mut chars = name.chars();
    // First character must be a lowercase letter so names are usable as
    // hostnames and SSH command arguments.
    let first = chars.next().unwrap();
    if !first.is_ascii_lowercase() {
        return Err(anyhow!(DevmError::Validation(format!(
            "Container name '{}' must start with a lowercase letter.",
            name
        ))));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(anyhow!(DevmError::Validation(format!(
            "Container name '{}' contains invalid character '{}'. Allowed: a-z, 0-9, '-'.",
            name, bad
        ))));
    }
    if name.ends_with('-') {
        return Err(anyhow!(DevmError::Validation(format!(
            "Container name '{}' must not end with '-'.",
            name
        ))));
    }
    Ok(())
}

/// Validates an image reference (name, optionally registry/tag qualified).
pub fn validate_image_reference(image: &str) -> Result<()> {
    if image.is_empty() {
        return Err(anyhow!(DevmError::Validation(
            "Image reference must not be empty.".to_string()
        )));
    }
    if image.len() > MAX_IMAGE_REF_LEN {
        return Err(anyhow!(DevmError::Validation(format!(
            "Image reference exceeds {} characters.",
            MAX_IMAGE_REF_LEN
        ))));
    }
    if let Some(bad) = image.chars().find(|c| {
        !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | ':'))
    }) {
        return Err(anyhow!(DevmError::Validation(format!(
            "Image reference '{}' contains invalid character '{}'.",
            image, bad
        ))));
    }
    Ok(())
}
