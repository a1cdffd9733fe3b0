//! Clears an attachment's route table binding.
//!
//! The control plane can accept a disassociate request well before the
//! binding actually disappears, and a read right after may still show the
//! old association. Rather than issue one request and wait passively, the
//! loop re-issues the request on every iteration and re-reads afterwards.

use tracing::{debug, info, warn};

use tgw_core::{AttachmentStatus, ControlPlaneError};

use crate::control_plane::AttachmentControlPlane;
use crate::error::{ReconcileError, ReconcileResult};
use crate::poll::PollPolicy;
use crate::reader;

/// Disassociate `current` from whatever route table it is bound to and
/// poll until a read shows no association.
///
/// Returns the first unbound observation. An unbound `current` is
/// returned unchanged without any remote call.
pub async fn disassociate_until_clear(
    control_plane: &dyn AttachmentControlPlane,
    current: AttachmentStatus,
    policy: &PollPolicy,
) -> ReconcileResult<AttachmentStatus> {
    let mut status = current;
    let mut attempts = 0u32;

    while let Some(route_table_id) = status.association.clone() {
        if policy.exhausted(attempts) {
            warn!(
                attachment_id = %status.attachment_id,
                %route_table_id,
                attempts,
                "attachment still associated, giving up"
            );
            return Err(ReconcileError::Timeout {
                attachment_id: status.attachment_id,
                stage: "waiting for disassociation",
                attempts,
            });
        }

        if attempts == 0 {
            info!(
                attachment_id = %status.attachment_id,
                %route_table_id,
                "attachment already associated, removing association"
            );
        }

        match control_plane
            .disassociate_route_table(&status.attachment_id, &route_table_id)
            .await
        {
            Ok(()) => {}
            // A previous request is still being applied, or already was.
            Err(ControlPlaneError::IncorrectState(reason))
            | Err(ControlPlaneError::NotFound(reason)) => {
                debug!(
                    attachment_id = %status.attachment_id,
                    %route_table_id,
                    %reason,
                    "disassociate not accepted, re-reading"
                );
            }
            Err(e) => return Err(e.into()),
        }

        policy.pause().await;
        attempts += 1;

        status = reader::describe(control_plane, &status.attachment_id).await?;
        if status.is_bound() {
            debug!(
                attachment_id = %status.attachment_id,
                attempt = attempts,
                "waiting for disassociation"
            );
        }
    }

    if attempts > 0 {
        info!(attachment_id = %status.attachment_id, attempts, "attachment disassociated");
    }
    Ok(status)
}
