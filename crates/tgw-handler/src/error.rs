use thiserror::Error;

use tgw_attachment::ReconcileError;
use tgw_core::EventError;
use tgw_firewall::FirewallError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Firewall(#[from] FirewallError),

    #[error("attachment event received but no route tables are configured")]
    RouteTablesNotConfigured,

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type HandlerResult<T> = Result<T, HandlerError>;
