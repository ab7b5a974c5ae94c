// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Configuration loader for [`crate::config::Config`].
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file into
//!    a [`VorionFileConfig`].
//! 2. **Environment variables** — [`load_config_from_env`] reads `VORION_`-prefixed
//!    environment variables and constructs a [`VorionFileConfig`].
//!
//! Both loaders are only available when the `config-loader` feature is
//! active (it implies `std`).
//!
//! [`VorionFileConfig`] exposes the deployment knobs an operator actually
//! tunes; fields [`crate::config::Config`] carries that are rarely touched
//! outside of tests (e.g. `simulate_concurrency`) are left at their
//! built-in default and are not settable here.
//!
//! # File format
//!
//! ```toml
//! default_deny_on_missing_trust = false
//! cache_ttl_ms                  = 60000
//! audit_flush_interval_ms       = 1000
//! constraint_timeout_ms         = 100
//! breaker_failure_threshold     = 5
//! rate_limit_fail_open          = true
//! max_payload_bytes             = 1048576
//! production_error_sanitization = true
//! ```
//!
//! # Environment variables
//!
//! | Variable                             | Type    | Default   |
//! |---------------------------------------|---------|-----------|
//! | `VORION_DEFAULT_DENY_ON_MISSING_TRUST`| boolean | false     |
//! | `VORION_CACHE_TTL_MS`                 | integer | 60000     |
//! | `VORION_AUDIT_FLUSH_INTERVAL_MS`      | integer | 1000      |
//! | `VORION_CONSTRAINT_TIMEOUT_MS`        | integer | 100       |
//! | `VORION_BREAKER_FAILURE_THRESHOLD`    | integer | 5         |
//! | `VORION_RATE_LIMIT_FAIL_OPEN`         | boolean | true      |
//! | `VORION_MAX_PAYLOAD_BYTES`            | integer | 1048576   |
//! | `VORION_PRODUCTION_ERROR_SANITIZATION`| boolean | true      |

// Only compile this module when the "config-loader" feature is enabled.
// "config-loader" implies "std", so std facilities are always available here.
#![cfg(feature = "config-loader")]

use std::fmt;
use std::fs;
use std::num::{ParseIntError, TryFromIntError};

use serde::{Deserialize, Serialize};

use crate::config::Config;

// ---------------------------------------------------------------------------
// VorionFileConfig
// ---------------------------------------------------------------------------

/// Flat, serialisation-friendly configuration loaded from TOML or
/// environment variables. Converts into the engine-internal
/// [`crate::config::Config`] via [`Into`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VorionFileConfig {
    #[serde(default)]
    pub default_deny_on_missing_trust: bool,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "default_audit_flush_interval_ms")]
    pub audit_flush_interval_ms: u64,
    #[serde(default = "default_constraint_timeout_ms")]
    pub constraint_timeout_ms: u64,
    #[serde(default = "default_breaker_failure_threshold")]
    pub breaker_failure_threshold: u32,
    #[serde(default = "default_rate_limit_fail_open")]
    pub rate_limit_fail_open: bool,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
    #[serde(default = "default_production_error_sanitization")]
    pub production_error_sanitization: bool,
}

fn default_cache_ttl_ms() -> u64 { 60_000 }
fn default_audit_flush_interval_ms() -> u64 { 1_000 }
fn default_constraint_timeout_ms() -> u64 { 100 }
fn default_breaker_failure_threshold() -> u32 { 5 }
fn default_rate_limit_fail_open() -> bool { true }
fn default_max_payload_bytes() -> u64 { 1024 * 1024 }
fn default_production_error_sanitization() -> bool { true }

impl Default for VorionFileConfig {
    fn default() -> Self {
        Self {
            default_deny_on_missing_trust: false,
            cache_ttl_ms: default_cache_ttl_ms(),
            audit_flush_interval_ms: default_audit_flush_interval_ms(),
            constraint_timeout_ms: default_constraint_timeout_ms(),
            breaker_failure_threshold: default_breaker_failure_threshold(),
            rate_limit_fail_open: default_rate_limit_fail_open(),
            max_payload_bytes: default_max_payload_bytes(),
            production_error_sanitization: default_production_error_sanitization(),
        }
    }
}

impl From<VorionFileConfig> for Config {
    fn from(file: VorionFileConfig) -> Self {
        Config {
            default_deny_on_missing_trust: file.default_deny_on_missing_trust,
            cache_ttl_ms: file.cache_ttl_ms,
            audit_flush_interval_ms: file.audit_flush_interval_ms,
            constraint_timeout_ms: file.constraint_timeout_ms,
            breaker_failure_threshold: file.breaker_failure_threshold,
            rate_limit_fail_open: file.rate_limit_fail_open,
            max_payload_bytes: file.max_payload_bytes as usize,
            production_error_sanitization: file.production_error_sanitization,
            ..Config::default()
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing Vorion configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required file could not be opened.
    FileRead { path: String, source: std::io::Error },
    /// The TOML content could not be deserialised.
    TomlParse { source: toml::de::Error },
    /// A field could not be parsed to its expected type.
    ParseField { field: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, source } =>
                write!(f, "failed to read config file \"{path}\": {source}"),
            ConfigError::TomlParse { source } =>
                write!(f, "failed to parse TOML config: {source}"),
            ConfigError::ParseField { field, value, reason } =>
                write!(f, "field \"{field}\": cannot parse \"{value}\" — {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            ConfigError::TomlParse { source } => Some(source),
            ConfigError::ParseField { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load a [`VorionFileConfig`] from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or if the TOML
/// content does not match the expected schema.
///
/// # Example
///
/// ```rust,no_run
/// use vorion_core::config_loader::load_config;
///
/// let config = load_config("/etc/vorion/engine.toml").unwrap();
/// println!("cache ttl: {}ms", config.cache_ttl_ms);
/// ```
pub fn load_config(path: &str) -> Result<VorionFileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;

    toml::from_str::<VorionFileConfig>(&content)
        .map_err(|source| ConfigError::TomlParse { source })
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load a [`VorionFileConfig`] from `VORION_`-prefixed environment
/// variables. Unset variables fall back to their defaults.
///
/// # Errors
///
/// Returns a [`ConfigError::ParseField`] if any variable is set to a value
/// that cannot be parsed to its expected type.
pub fn load_config_from_env() -> Result<VorionFileConfig, ConfigError> {
    Ok(VorionFileConfig {
        default_deny_on_missing_trust: read_env_bool(
            "VORION_DEFAULT_DENY_ON_MISSING_TRUST",
            false,
        )?,
        cache_ttl_ms: read_env_u64("VORION_CACHE_TTL_MS", default_cache_ttl_ms())?,
        audit_flush_interval_ms: read_env_u64(
            "VORION_AUDIT_FLUSH_INTERVAL_MS",
            default_audit_flush_interval_ms(),
        )?,
        constraint_timeout_ms: read_env_u64(
            "VORION_CONSTRAINT_TIMEOUT_MS",
            default_constraint_timeout_ms(),
        )?,
        breaker_failure_threshold: read_env_u32(
            "VORION_BREAKER_FAILURE_THRESHOLD",
            default_breaker_failure_threshold(),
        )?,
        rate_limit_fail_open: read_env_bool(
            "VORION_RATE_LIMIT_FAIL_OPEN",
            default_rate_limit_fail_open(),
        )?,
        max_payload_bytes: read_env_u64("VORION_MAX_PAYLOAD_BYTES", default_max_payload_bytes())?,
        production_error_sanitization: read_env_bool(
            "VORION_PRODUCTION_ERROR_SANITIZATION",
            default_production_error_sanitization(),
        )?,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().map_err(|source: ParseIntError| {
            ConfigError::ParseField {
                field: key.to_owned(),
                value: val,
                reason: source.to_string(),
            }
        }),
        Err(_) => Ok(default),
    }
}

fn read_env_u32(key: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(key) {
        Ok(val) => {
            let parsed = val.trim().parse::<u64>().map_err(|source: ParseIntError| {
                ConfigError::ParseField {
                    field: key.to_owned(),
                    value: val.clone(),
                    reason: source.to_string(),
                }
            })?;
            u32::try_from(parsed).map_err(|source: TryFromIntError| ConfigError::ParseField {
                field: key.to_owned(),
                value: val,
                reason: source.to_string(),
            })
        }
        Err(_) => Ok(default),
    }
}

fn read_env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::ParseField {
                field: key.to_owned(),
                value: other.to_owned(),
                reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
            }),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_converts_into_engine_config() {
        let file = VorionFileConfig {
            cache_ttl_ms: 5_000,
            ..VorionFileConfig::default()
        };
        let config: Config = file.into();
        assert_eq!(config.cache_ttl_ms, 5_000);
        // Untouched fields keep the engine-internal default.
        assert_eq!(config.cache_local_capacity, Config::default().cache_local_capacity);
    }

    #[test]
    fn env_loader_falls_back_to_defaults_when_unset() {
        std::env::remove_var("VORION_CACHE_TTL_MS");
        let config = load_config_from_env().unwrap();
        assert_eq!(config.cache_ttl_ms, default_cache_ttl_ms());
    }

    #[test]
    fn env_loader_rejects_unparseable_bool() {
        std::env::set_var("VORION_RATE_LIMIT_FAIL_OPEN", "maybe");
        let result = load_config_from_env();
        std::env::remove_var("VORION_RATE_LIMIT_FAIL_OPEN");
        assert!(result.is_err());
    }
}
