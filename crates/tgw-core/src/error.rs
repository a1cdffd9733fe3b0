//! Error types shared across the controller crates.

use thiserror::Error;

/// Errors reported by a remote control plane (transit gateway, VPC routes).
///
/// Adapters classify service responses into these buckets so the
/// reconciliation loops can decide what is transient and what is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// The referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource exists but is mid-transition; the request may be
    /// re-issued later.
    #[error("incorrect state: {0}")]
    IncorrectState(String),

    /// The requested binding already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("control plane error: {0}")]
    Service(String),
}

pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;

/// Errors decoding a trigger event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("malformed event: missing or invalid field `{0}`")]
    MissingField(String),

    #[error("malformed event: unexpected event `{0}`")]
    UnexpectedEvent(String),

    #[error("malformed event: {0}")]
    Invalid(String),
}

pub type EventResult<T> = Result<T, EventError>;

/// Errors loading controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
