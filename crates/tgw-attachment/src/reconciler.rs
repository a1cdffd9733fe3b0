//! Top-level attachment reconciliation.
//!
//! Runs reader → waiter → disassociation loop → driver for one
//! attachment, sequentially. No side effect is issued before the
//! attachment has been observed `available`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, instrument};

use tgw_core::event::AttachmentCreated;
use tgw_core::{ConfigResult, ControllerConfig, Role, RouteTables};

use crate::control_plane::AttachmentControlPlane;
use crate::driver;
use crate::error::{ReconcileError, ReconcileResult};
use crate::poll::PollPolicy;
use crate::{disassociate, reader, waiter};

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub attachment_id: String,
    pub role: Role,
    /// Route table the attachment was bound to before this run.
    pub disassociated_from: Option<String>,
    pub associated_with: String,
    pub propagated_to: Option<String>,
}

/// Drives transit gateway attachments to the route table their role
/// selects.
///
/// Holds no per-attachment state; one reconciler can serve any number of
/// concurrent runs.
pub struct AttachmentReconciler {
    control_plane: Arc<dyn AttachmentControlPlane>,
    route_tables: RouteTables,
    policy: PollPolicy,
    deadline: Option<Duration>,
}

impl AttachmentReconciler {
    pub fn new(control_plane: Arc<dyn AttachmentControlPlane>, route_tables: RouteTables) -> Self {
        Self {
            control_plane,
            route_tables,
            policy: PollPolicy::default(),
            deadline: None,
        }
    }

    /// Build a reconciler from controller configuration.
    ///
    /// Fails if either route table id is missing.
    pub fn from_config(
        control_plane: Arc<dyn AttachmentControlPlane>,
        config: &ControllerConfig,
    ) -> ConfigResult<Self> {
        Ok(Self::new(control_plane, config.route_tables()?)
            .with_policy(PollPolicy::from_config(config)?)
            .with_deadline(config.deadline()?))
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound each run by a wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn route_tables(&self) -> &RouteTables {
        &self.route_tables
    }

    /// Decode an attachment-created event and reconcile the attachment.
    pub async fn handle_event(&self, event: &Value) -> ReconcileResult<ReconcileOutcome> {
        let created = AttachmentCreated::from_value(event)?;
        self.reconcile_created(&created).await
    }

    /// Reconcile the attachment named by an already decoded event.
    pub async fn reconcile_created(
        &self,
        created: &AttachmentCreated,
    ) -> ReconcileResult<ReconcileOutcome> {
        self.reconcile(&created.attachment_id, &created.role).await
    }

    /// Reconcile one attachment.
    ///
    /// Input is validated before any remote call. Re-running for the same
    /// attachment ends in the same bindings.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        attachment_id: &str,
        role: &str,
    ) -> ReconcileResult<ReconcileOutcome> {
        let role = validate(attachment_id, role)?;

        let outcome = match self.deadline {
            None => self.run(attachment_id, role).await?,
            Some(deadline) => tokio::time::timeout(deadline, self.run(attachment_id, role))
                .await
                .map_err(|_| ReconcileError::DeadlineExceeded {
                    attachment_id: attachment_id.to_string(),
                    deadline,
                })??,
        };

        info!(
            %attachment_id,
            %role,
            associated_with = %outcome.associated_with,
            propagated_to = ?outcome.propagated_to,
            "attachment reconciled"
        );
        Ok(outcome)
    }

    async fn run(&self, attachment_id: &str, role: Role) -> ReconcileResult<ReconcileOutcome> {
        let control_plane = self.control_plane.as_ref();

        let status = reader::describe(control_plane, attachment_id).await?;
        let status = waiter::wait_until_settled(control_plane, status, &self.policy).await?;
        if !status.state.is_available() {
            return Err(ReconcileError::AttachmentNotAvailable {
                attachment_id: attachment_id.to_string(),
                state: status.state,
            });
        }

        let disassociated_from = status.association.clone();
        disassociate::disassociate_until_clear(control_plane, status, &self.policy).await?;

        let applied =
            driver::associate_and_propagate(control_plane, attachment_id, role, &self.route_tables)
                .await?;

        Ok(ReconcileOutcome {
            attachment_id: attachment_id.to_string(),
            role,
            disassociated_from,
            associated_with: applied.associated_with,
            propagated_to: applied.propagated_to,
        })
    }
}

/// Check an attachment id and raw role tag without touching the control
/// plane.
pub fn validate(attachment_id: &str, role: &str) -> ReconcileResult<Role> {
    if attachment_id.is_empty() {
        return Err(ReconcileError::InvalidInput(
            "attachment id is empty".to_string(),
        ));
    }
    Role::parse(role).ok_or_else(|| {
        ReconcileError::InvalidInput(format!(
            "unsupported role {role:?} (expected \"workload\" or \"inspection\")"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::MockAttachmentControlPlane;
    use crate::testing::{available, pending, Call, ScriptedControlPlane};
    use serde_json::json;
    use tgw_core::{AttachmentState, AttachmentStatus, ControlPlaneError, EventError};

    fn tables() -> RouteTables {
        RouteTables::new("rtb-workload", "rtb-inspection")
    }

    fn reconciler(cp: Arc<dyn AttachmentControlPlane>) -> AttachmentReconciler {
        AttachmentReconciler::new(cp, tables()).with_policy(PollPolicy::new(Duration::ZERO, None))
    }

    #[tokio::test]
    async fn workload_bound_to_inspection_is_moved() {
        let cp = Arc::new(ScriptedControlPlane::new([
            available("tgw-attach-1", Some("rtb-inspection")),
            available("tgw-attach-1", None),
        ]));

        let outcome = reconciler(cp.clone())
            .reconcile("tgw-attach-1", "workload")
            .await
            .unwrap();

        assert_eq!(
            cp.mutations(),
            vec![
                Call::Disassociate {
                    attachment_id: "tgw-attach-1".into(),
                    route_table_id: "rtb-inspection".into(),
                },
                Call::Associate {
                    attachment_id: "tgw-attach-1".into(),
                    route_table_id: "rtb-workload".into(),
                },
                Call::EnablePropagation {
                    attachment_id: "tgw-attach-1".into(),
                    route_table_id: "rtb-inspection".into(),
                },
            ]
        );
        assert_eq!(outcome.disassociated_from.as_deref(), Some("rtb-inspection"));
        assert_eq!(outcome.associated_with, "rtb-workload");
        assert_eq!(outcome.propagated_to.as_deref(), Some("rtb-inspection"));
    }

    #[tokio::test]
    async fn pending_inspection_attachment_polls_twice() {
        let cp = Arc::new(ScriptedControlPlane::new([
            pending("tgw-attach-2"),
            available("tgw-attach-2", None),
        ]));

        reconciler(cp.clone())
            .reconcile("tgw-attach-2", "inspection")
            .await
            .unwrap();

        assert_eq!(
            cp.calls(),
            vec![
                Call::Describe("tgw-attach-2".into()),
                Call::Describe("tgw-attach-2".into()),
                Call::Associate {
                    attachment_id: "tgw-attach-2".into(),
                    route_table_id: "rtb-inspection".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn workload_issues_one_associate_and_one_propagation() {
        let cp = Arc::new(ScriptedControlPlane::new([available("a", None)]));
        reconciler(cp.clone()).reconcile("a", "workload").await.unwrap();

        assert_eq!(cp.associated_with(), vec!["rtb-workload".to_string()]);
        assert_eq!(cp.propagated_to(), vec!["rtb-inspection".to_string()]);
    }

    #[tokio::test]
    async fn inspection_issues_no_propagation() {
        let cp = Arc::new(ScriptedControlPlane::new([available("a", None)]));
        let outcome = reconciler(cp.clone()).reconcile("a", "inspection").await.unwrap();

        assert_eq!(cp.associated_with(), vec!["rtb-inspection".to_string()]);
        assert!(cp.propagated_to().is_empty());
        assert_eq!(outcome.propagated_to, None);
    }

    #[tokio::test]
    async fn unknown_role_makes_no_remote_calls() {
        // Any call on an unconfigured mock panics.
        let cp = Arc::new(MockAttachmentControlPlane::new());
        let err = reconciler(cp).reconcile("a", "egress").await.unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput(ref msg) if msg.contains("egress")));
    }

    #[tokio::test]
    async fn empty_attachment_id_makes_no_remote_calls() {
        let cp = Arc::new(MockAttachmentControlPlane::new());
        let err = reconciler(cp).reconcile("", "workload").await.unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn malformed_event_makes_no_remote_calls() {
        let cp = Arc::new(MockAttachmentControlPlane::new());
        let err = reconciler(cp)
            .handle_event(&json!({ "detail": { "eventName": "CreateTransitGatewayVpcAttachment" } }))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedEvent(_)));
    }

    #[tokio::test]
    async fn event_without_role_tag_makes_no_remote_calls() {
        let cp = Arc::new(MockAttachmentControlPlane::new());
        let event = json!({
            "source": "aws.ec2",
            "detail": {
                "eventName": "CreateTransitGatewayVpcAttachment",
                "requestParameters": {
                    "CreateTransitGatewayVpcAttachmentRequest": {
                        "TagSpecifications": { "Tag": [{ "Key": "Name", "Value": "inspection" }] }
                    }
                },
                "responseElements": {
                    "CreateTransitGatewayVpcAttachmentResponse": {
                        "transitGatewayVpcAttachment": { "transitGatewayAttachmentId": "tgw-attach-1" }
                    }
                }
            }
        });

        let err = reconciler(cp).handle_event(&event).await.unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedEvent(EventError::MissingField(_))));
    }

    #[tokio::test]
    async fn association_failure_skips_propagation() {
        let cp = Arc::new(
            ScriptedControlPlane::new([available("a", None)])
                .fail_association(ControlPlaneError::Service("throttled".into())),
        );
        let err = reconciler(cp.clone()).reconcile("a", "workload").await.unwrap_err();

        assert!(matches!(err, ReconcileError::ControlPlane(ControlPlaneError::Service(_))));
        assert_eq!(cp.associated_with(), vec!["rtb-workload".to_string()]);
        assert!(cp.propagated_to().is_empty());
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert_eq!(validate("a", "workload").unwrap(), Role::Workload);
        assert!(matches!(validate("", "workload"), Err(ReconcileError::InvalidInput(_))));
        assert!(matches!(validate("a", "Workload"), Err(ReconcileError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn handle_event_reconciles_decoded_attachment() {
        let cp = Arc::new(ScriptedControlPlane::new([available("tgw-attach-9", None)]));
        let event = json!({
            "source": "aws.ec2",
            "detail": {
                "eventName": "CreateTransitGatewayVpcAttachment",
                "requestParameters": {
                    "CreateTransitGatewayVpcAttachmentRequest": {
                        "TagSpecifications": { "Tag": { "Key": "routeTable", "Value": "inspection" } }
                    }
                },
                "responseElements": {
                    "CreateTransitGatewayVpcAttachmentResponse": {
                        "transitGatewayVpcAttachment": { "transitGatewayAttachmentId": "tgw-attach-9" }
                    }
                }
            }
        });

        let outcome = reconciler(cp.clone()).handle_event(&event).await.unwrap();
        assert_eq!(outcome.attachment_id, "tgw-attach-9");
        assert_eq!(outcome.role, Role::Inspection);
    }

    #[tokio::test]
    async fn missing_attachment_is_not_retried() {
        let cp = Arc::new(ScriptedControlPlane::missing());
        let err = reconciler(cp.clone()).reconcile("a", "workload").await.unwrap_err();
        assert!(matches!(err, ReconcileError::AttachmentNotFound(_)));
        assert_eq!(cp.describe_count(), 1);
        assert!(cp.mutations().is_empty());
    }

    #[tokio::test]
    async fn failed_attachment_gets_no_side_effects() {
        let cp = Arc::new(ScriptedControlPlane::new([
            pending("a"),
            AttachmentStatus::new("a", AttachmentState::Other("failed".into()), Some("rtb-x")),
        ]));
        let err = reconciler(cp.clone()).reconcile("a", "workload").await.unwrap_err();
        assert!(matches!(err, ReconcileError::AttachmentNotAvailable { .. }));
        assert!(cp.mutations().is_empty());
    }

    #[tokio::test]
    async fn pending_and_bound_waits_before_disassociating() {
        let cp = Arc::new(ScriptedControlPlane::new([
            AttachmentStatus::new("a", AttachmentState::Pending, Some("rtb-x")),
            available("a", Some("rtb-x")),
            available("a", None),
        ]));
        reconciler(cp.clone()).reconcile("a", "inspection").await.unwrap();

        let calls = cp.calls();
        assert_eq!(calls[0], Call::Describe("a".into()));
        assert_eq!(calls[1], Call::Describe("a".into()));
        assert!(matches!(calls[2], Call::Disassociate { .. }));
    }

    #[tokio::test]
    async fn propagation_failure_leaves_association() {
        let cp = Arc::new(
            ScriptedControlPlane::new([available("a", None)])
                .fail_propagation(ControlPlaneError::Service("throttled".into())),
        );
        let err = reconciler(cp.clone()).reconcile("a", "workload").await.unwrap_err();

        assert!(matches!(err, ReconcileError::PartialCompletion { .. }));
        assert_eq!(cp.associated_with(), vec!["rtb-workload".to_string()]);
        assert_eq!(cp.disassociate_count(), 0);
    }

    #[tokio::test]
    async fn rerun_converges_on_same_binding() {
        let cp = Arc::new(ScriptedControlPlane::new([
            available("a", None),
            available("a", Some("rtb-workload")),
            available("a", None),
        ]));
        let reconciler = reconciler(cp.clone());

        let first = reconciler.reconcile("a", "workload").await.unwrap();
        let second = reconciler.reconcile("a", "workload").await.unwrap();

        assert_eq!(first.associated_with, second.associated_with);
        assert_eq!(second.disassociated_from.as_deref(), Some("rtb-workload"));
        assert_eq!(cp.associated_with().len(), 2);
    }

    #[tokio::test]
    async fn deadline_bounds_the_whole_run() {
        let cp = Arc::new(ScriptedControlPlane::new([pending("a")]));
        let reconciler = AttachmentReconciler::new(cp.clone(), tables())
            .with_policy(PollPolicy::new(Duration::from_millis(5), None))
            .with_deadline(Some(Duration::from_millis(40)));

        let err = reconciler.reconcile("a", "workload").await.unwrap_err();
        assert!(matches!(err, ReconcileError::DeadlineExceeded { .. }));
        assert!(err.is_timeout());
        assert!(cp.mutations().is_empty());
    }

    #[test]
    fn from_config_requires_route_tables() {
        let cp: Arc<dyn AttachmentControlPlane> = Arc::new(MockAttachmentControlPlane::new());
        assert!(AttachmentReconciler::from_config(cp.clone(), &ControllerConfig::default()).is_err());

        let config = ControllerConfig::from_toml_str(
            "[route_tables]\nworkload = \"w\"\ninspection = \"i\"\n[polling]\ndeadline = \"90s\"\n",
        )
        .unwrap();
        let reconciler = AttachmentReconciler::from_config(cp, &config).unwrap();
        assert_eq!(reconciler.route_tables(), &RouteTables::new("w", "i"));
        assert_eq!(reconciler.deadline, Some(Duration::from_secs(90)));
    }
}
