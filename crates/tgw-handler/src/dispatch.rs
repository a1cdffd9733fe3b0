//! Event classification and dispatch.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument};

use tgw_attachment::reconciler::validate;
use tgw_attachment::{AttachmentReconciler, ReconcileError, ReconcileOutcome};
use tgw_core::EventError;
use tgw_core::event::{AttachmentCreated, CustomResourceEvent};
use tgw_firewall::{EndpointResolver, EndpointResource, FirewallService, RouteResource, RouteTableWriter};

use crate::error::{HandlerError, HandlerResult};

/// `source` of EventBridge events carrying EC2 CloudTrail records.
pub const EC2_EVENT_SOURCE: &str = "aws.ec2";

/// One decoded invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// A decoded CloudTrail attachment-created record with a known role.
    AttachmentCreated(AttachmentCreated),
    EndpointResource(CustomResourceEvent),
    RouteResource(CustomResourceEvent),
}

impl Invocation {
    /// Decide which handler an event is for. Never touches the network.
    ///
    /// Attachment events are fully decoded and their role checked here, so
    /// a bad event fails before any configuration lookup or remote call.
    pub fn classify(event: Value) -> HandlerResult<Self> {
        if event.get("source").and_then(Value::as_str) == Some(EC2_EVENT_SOURCE) {
            let created = AttachmentCreated::from_value(&event)
                .map_err(|e| HandlerError::Reconcile(ReconcileError::from(e)))?;
            validate(&created.attachment_id, &created.role)?;
            return Ok(Invocation::AttachmentCreated(created));
        }

        if event.get("RequestType").is_none() {
            let shape = event
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or("unknown event shape")
                .to_string();
            return Err(EventError::UnexpectedEvent(shape).into());
        }

        let request = CustomResourceEvent::from_value(event)?;
        if request.has_property("RouteTableId") && request.has_property("DestinationCidr") {
            Ok(Invocation::RouteResource(request))
        } else if request.has_property("FirewallName") && request.has_property("AvailabilityZone") {
            Ok(Invocation::EndpointResource(request))
        } else {
            Err(EventError::Invalid(
                "custom resource properties describe neither an endpoint lookup nor a route"
                    .to_string(),
            )
            .into())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Invocation::AttachmentCreated(_) => "attachment",
            Invocation::EndpointResource(_) => "endpoint",
            Invocation::RouteResource(_) => "route",
        }
    }

    /// Whether handling this invocation needs route table ids.
    pub fn needs_route_tables(&self) -> bool {
        matches!(self, Invocation::AttachmentCreated(_))
    }
}

/// Routes invocations to their handlers.
pub struct Dispatcher {
    reconciler: Option<AttachmentReconciler>,
    endpoints: EndpointResource,
    routes: RouteResource,
}

impl Dispatcher {
    pub fn new(firewalls: Arc<dyn FirewallService>, routes: Arc<dyn RouteTableWriter>) -> Self {
        let resolver = EndpointResolver::new(firewalls);
        Self {
            reconciler: None,
            endpoints: EndpointResource::new(resolver.clone()),
            routes: RouteResource::new(resolver, routes),
        }
    }

    pub fn with_reconciler(mut self, reconciler: AttachmentReconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    /// Run one invocation and return its JSON response.
    ///
    /// Custom resource requests always produce a response document; a
    /// `FAILED` status in it is not an error here.
    #[instrument(skip_all, fields(kind = invocation.kind()))]
    pub async fn dispatch(&self, invocation: Invocation) -> HandlerResult<Value> {
        match invocation {
            Invocation::AttachmentCreated(created) => {
                let reconciler = self
                    .reconciler
                    .as_ref()
                    .ok_or(HandlerError::RouteTablesNotConfigured)?;
                let outcome = reconciler.reconcile_created(&created).await?;
                info!(attachment_id = %outcome.attachment_id, "attachment reconciled");
                Ok(outcome_json(&outcome))
            }
            Invocation::EndpointResource(request) => {
                let response = self.endpoints.handle(&request).await?;
                Ok(serde_json::to_value(response)?)
            }
            Invocation::RouteResource(request) => {
                let response = self.routes.handle(&request).await?;
                Ok(serde_json::to_value(response)?)
            }
        }
    }
}

fn outcome_json(outcome: &ReconcileOutcome) -> Value {
    json!({
        "AttachmentId": outcome.attachment_id,
        "Role": outcome.role.as_str(),
        "DisassociatedFrom": outcome.disassociated_from,
        "AssociatedWith": outcome.associated_with,
        "PropagatedTo": outcome.propagated_to,
    })
}
