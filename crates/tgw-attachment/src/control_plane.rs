//! The transit gateway control plane, as seen by the reconciler.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use tgw_core::{AttachmentStatus, ControlPlaneResult};

/// Remote operations on transit gateway attachments.
///
/// Implementations talk to the real control plane; tests use mocks or
/// the scripted fake in [`crate::testing`]. All mutating calls must be
/// safe to re-issue.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AttachmentControlPlane: Send + Sync {
    /// Read the attachment's state and association.
    ///
    /// Returns `Ok(None)` when the control plane has no such attachment.
    async fn describe_attachment(
        &self,
        attachment_id: &str,
    ) -> ControlPlaneResult<Option<AttachmentStatus>>;

    /// Bind the attachment to a route table.
    async fn associate_route_table(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()>;

    /// Remove the attachment's binding to a route table.
    async fn disassociate_route_table(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()>;

    /// Make a route table learn the attachment's routes.
    async fn enable_route_propagation(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()>;
}
