//! Attachment state reader.

use tracing::debug;

use tgw_core::AttachmentStatus;

use crate::control_plane::AttachmentControlPlane;
use crate::error::{ReconcileError, ReconcileResult};

/// Read an attachment's current state and association.
///
/// A missing attachment is fatal: it means the caller has the wrong id or
/// the attachment was deleted underneath us, and neither is safe to retry.
pub async fn describe(
    control_plane: &dyn AttachmentControlPlane,
    attachment_id: &str,
) -> ReconcileResult<AttachmentStatus> {
    let status = control_plane
        .describe_attachment(attachment_id)
        .await?
        .ok_or_else(|| ReconcileError::AttachmentNotFound(attachment_id.to_string()))?;

    debug!(
        %attachment_id,
        state = %status.state,
        association = ?status.association,
        "observed attachment"
    );
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::MockAttachmentControlPlane;
    use tgw_core::{AttachmentState, ControlPlaneError};

    #[tokio::test]
    async fn returns_observed_status() {
        let mut mock = MockAttachmentControlPlane::new();
        mock.expect_describe_attachment()
            .times(1)
            .returning(|id| {
                assert_eq!(id, "tgw-attach-1");
                Ok(Some(AttachmentStatus::new(
                    id,
                    AttachmentState::Available,
                    Some("rtb-inspection"),
                )))
            });

        let status = describe(&mock, "tgw-attach-1").await.unwrap();
        assert_eq!(status.state, AttachmentState::Available);
        assert_eq!(status.association.as_deref(), Some("rtb-inspection"));
    }

    #[tokio::test]
    async fn missing_attachment_is_fatal() {
        let mut mock = MockAttachmentControlPlane::new();
        mock.expect_describe_attachment()
            .times(1)
            .returning(|_| Ok(None));

        let err = describe(&mock, "tgw-attach-gone").await.unwrap_err();
        assert!(matches!(err, ReconcileError::AttachmentNotFound(id) if id == "tgw-attach-gone"));
    }

    #[tokio::test]
    async fn control_plane_errors_propagate_unchanged() {
        let mut mock = MockAttachmentControlPlane::new();
        mock.expect_describe_attachment()
            .times(1)
            .returning(|_| Err(ControlPlaneError::Service("throttled".to_string())));

        let err = describe(&mock, "tgw-attach-1").await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::ControlPlane(ControlPlaneError::Service(ref msg)) if msg == "throttled"
        ));
    }
}
