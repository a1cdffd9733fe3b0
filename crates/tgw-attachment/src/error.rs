//! Reconciliation error types.

use std::time::Duration;

use thiserror::Error;

use tgw_core::{AttachmentState, ControlPlaneError, EventError};

/// Errors that end a reconciliation run.
///
/// None of these are retried inside the crate; they propagate to whoever
/// invoked the run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The trigger event could not be decoded. No remote call was made.
    #[error(transparent)]
    MalformedEvent(#[from] EventError),

    /// The request names an unsupported role or no attachment. No remote
    /// call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),

    /// The attachment left `pending` for something other than `available`.
    #[error("attachment {attachment_id} is {state}, not available")]
    AttachmentNotAvailable {
        attachment_id: String,
        state: AttachmentState,
    },

    /// Association succeeded but propagation did not. The association is
    /// left in place.
    #[error(
        "attachment {attachment_id} associated with {associated_with} but propagation into {propagation_target} failed: {source}"
    )]
    PartialCompletion {
        attachment_id: String,
        associated_with: String,
        propagation_target: String,
        #[source]
        source: ControlPlaneError,
    },

    /// A polling loop hit its attempt ceiling.
    #[error("timed out {stage} for attachment {attachment_id} after {attempts} polls")]
    Timeout {
        attachment_id: String,
        stage: &'static str,
        attempts: u32,
    },

    /// The whole run exceeded its deadline.
    #[error("reconciliation of {attachment_id} exceeded deadline of {deadline:?}")]
    DeadlineExceeded {
        attachment_id: String,
        deadline: Duration,
    },

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

impl ReconcileError {
    /// Whether the failure was a poll ceiling or deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ReconcileError::Timeout { .. } | ReconcileError::DeadlineExceeded { .. }
        )
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
