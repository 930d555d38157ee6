//! Core error types for pomoductivity-core.
//!
//! Validation failures are ordinary values the transport layer turns into
//! client errors. Alert and subscriber failures are logged where they happen
//! and never reach the caller of a timer command.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomoductivity-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected input (durations, session types)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Outbound alert errors
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    /// The driver task that owns the timer is gone
    #[error("Timer driver is not running")]
    DriverUnavailable,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A duration outside `1..=7200` seconds, or not an integer at all.
    #[error("Invalid value for '{field}': {value} (expected an integer between 1 and 7200 seconds)")]
    InvalidDuration { field: &'static str, value: String },

    /// Session type outside focus / short_break / long_break.
    #[error("Invalid session type '{0}': must be one of focus, short_break, long_break")]
    InvalidSessionType(String),

    /// A settings update that names none of the duration fields.
    #[error("At least one duration field must be provided")]
    EmptyUpdate,
}

/// Alert delivery errors.
#[derive(Error, Debug)]
pub enum AlertError {
    /// Network or TLS failure talking to the push endpoint
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Push endpoint rejected alert (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// A required credential is missing
    #[error("Alert sink not configured: missing {0}")]
    NotConfigured(&'static str),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
