//! Polls a pending attachment until it settles.

use tracing::{debug, info, warn};

use tgw_core::AttachmentStatus;

use crate::control_plane::AttachmentControlPlane;
use crate::error::{ReconcileError, ReconcileResult};
use crate::poll::PollPolicy;
use crate::reader;

/// Wait for an attachment to leave `pending`.
///
/// Each iteration sleeps one interval and then re-reads the attachment.
/// Returns the first observation whose state is not `pending`, whatever
/// that state is; deciding whether a non-`available` state is acceptable
/// is up to the caller. If `current` is not pending it is returned as is.
pub async fn wait_until_settled(
    control_plane: &dyn AttachmentControlPlane,
    current: AttachmentStatus,
    policy: &PollPolicy,
) -> ReconcileResult<AttachmentStatus> {
    if !current.state.is_pending() {
        return Ok(current);
    }

    let attachment_id = current.attachment_id;
    info!(%attachment_id, "attachment pending, waiting for it to settle");

    let mut attempts = 0u32;
    loop {
        if policy.exhausted(attempts) {
            warn!(%attachment_id, attempts, "attachment still pending, giving up");
            return Err(ReconcileError::Timeout {
                attachment_id,
                stage: "waiting for availability",
                attempts,
            });
        }

        policy.pause().await;
        attempts += 1;

        let status = reader::describe(control_plane, &attachment_id).await?;
        if !status.state.is_pending() {
            info!(%attachment_id, state = %status.state, attempts, "attachment settled");
            return Ok(status);
        }
        debug!(%attachment_id, attempt = attempts, "attachment still pending");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{available, pending, ScriptedControlPlane};
    use tgw_core::AttachmentState;

    fn fast(max_attempts: Option<u32>) -> PollPolicy {
        PollPolicy::new(Duration::ZERO, max_attempts)
    }

    #[tokio::test]
    async fn non_pending_returns_without_polling() {
        let cp = ScriptedControlPlane::new([available("a", None)]);
        let status = wait_until_settled(&cp, available("a", None), &fast(None))
            .await
            .unwrap();
        assert!(status.state.is_available());
        assert_eq!(cp.describe_count(), 0);
    }

    #[tokio::test]
    async fn polls_until_state_changes() {
        let cp = ScriptedControlPlane::new([
            pending("a"),
            pending("a"),
            pending("a"),
            available("a", None),
        ]);
        let status = wait_until_settled(&cp, pending("a"), &fast(None))
            .await
            .unwrap();
        assert!(status.state.is_available());
        assert_eq!(cp.describe_count(), 4);
    }

    #[tokio::test]
    async fn exits_on_terminal_failure_state() {
        let failed = AttachmentStatus::new("a", AttachmentState::Other("failed".into()), None);
        let cp = ScriptedControlPlane::new([pending("a"), failed.clone()]);
        let status = wait_until_settled(&cp, pending("a"), &fast(None))
            .await
            .unwrap();
        assert_eq!(status, failed);
    }

    #[tokio::test]
    async fn bounded_policy_times_out() {
        let cp = ScriptedControlPlane::new([pending("a")]);
        let err = wait_until_settled(&cp, pending("a"), &fast(Some(3)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Timeout { attempts: 3, .. }));
        assert!(err.is_timeout());
        assert_eq!(cp.describe_count(), 3);
    }

    #[tokio::test]
    async fn attachment_vanishing_mid_wait_is_fatal() {
        let cp = ScriptedControlPlane::missing();
        let err = wait_until_settled(&cp, pending("a"), &fast(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::AttachmentNotFound(_)));
    }
}
