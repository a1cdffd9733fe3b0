//! Binds the attachment and enables propagation.

use tracing::{info, warn};

use tgw_core::{ControlPlaneError, Role, RouteTables};

use crate::control_plane::AttachmentControlPlane;
use crate::error::{ReconcileError, ReconcileResult};

/// Bindings applied by [`associate_and_propagate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBindings {
    pub associated_with: String,
    pub propagated_to: Option<String>,
}

/// Associate the attachment with its role's route table, then enable
/// propagation if the role calls for it.
///
/// Issues exactly one associate call and at most one propagation call.
/// The two are not transactional: if propagation fails the association is
/// kept and [`ReconcileError::PartialCompletion`] is returned.
/// Propagation that already exists counts as success.
pub async fn associate_and_propagate(
    control_plane: &dyn AttachmentControlPlane,
    attachment_id: &str,
    role: Role,
    route_tables: &RouteTables,
) -> ReconcileResult<AppliedBindings> {
    let target = route_tables.association_target(role);

    info!(%attachment_id, %role, route_table_id = %target, "associating attachment");
    control_plane
        .associate_route_table(attachment_id, target)
        .await?;

    let Some(propagation_target) = route_tables.propagation_target(role) else {
        return Ok(AppliedBindings {
            associated_with: target.to_string(),
            propagated_to: None,
        });
    };

    info!(
        %attachment_id,
        route_table_id = %propagation_target,
        "enabling route propagation"
    );
    match control_plane
        .enable_route_propagation(attachment_id, propagation_target)
        .await
    {
        Ok(()) => {}
        Err(ControlPlaneError::AlreadyExists(_)) => {
            info!(%attachment_id, route_table_id = %propagation_target, "propagation already enabled");
        }
        Err(source) => {
            warn!(
                %attachment_id,
                associated_with = %target,
                error = %source,
                "propagation failed after association"
            );
            return Err(ReconcileError::PartialCompletion {
                attachment_id: attachment_id.to_string(),
                associated_with: target.to_string(),
                propagation_target: propagation_target.to_string(),
                source,
            });
        }
    }

    Ok(AppliedBindings {
        associated_with: target.to_string(),
        propagated_to: Some(propagation_target.to_string()),
    })
}
