//! Firewall lookup error types.

use thiserror::Error;

use tgw_core::EventError;

/// Hard failures of a firewall lookup.
///
/// A firewall that exists but has not published an endpoint for a zone
/// is not an error; resolvers report it as `None`.
#[derive(Debug, Error)]
pub enum FirewallError {
    #[error("firewall not found: {0}")]
    NotFound(String),

    #[error("firewall service error: {0}")]
    Service(String),

    #[error(transparent)]
    MalformedEvent(#[from] EventError),
}

pub type FirewallResult<T> = Result<T, FirewallError>;
