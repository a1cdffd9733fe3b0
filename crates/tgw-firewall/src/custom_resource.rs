//! CloudFormation custom resources backed by the endpoint resolver.
//!
//! Two resources are served:
//!
//! - [`EndpointResource`] returns the firewall endpoint id for one zone as
//!   `Data.EndpointId`, so a template can route to it.
//! - [`RouteResource`] creates (and on delete removes) a VPC route whose
//!   target is the zone's firewall endpoint.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, warn};

use tgw_core::{ControlPlaneError, EventError};
use tgw_core::event::{CustomResourceEvent, CustomResourceResponse, RequestType};

use crate::error::{FirewallError, FirewallResult};
use crate::resolver::EndpointResolver;
use crate::routes::RouteTableWriter;
use crate::service::FirewallRef;

/// Key under which the endpoint id is returned.
pub const ENDPOINT_ID_KEY: &str = "EndpointId";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointProperties {
    firewall_name: String,
    availability_zone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RouteProperties {
    #[serde(default)]
    firewall_arn: Option<String>,
    #[serde(default)]
    firewall_name: Option<String>,
    #[serde(default)]
    subnet_az: Option<String>,
    destination_cidr: String,
    route_table_id: String,
}

impl RouteProperties {
    fn firewall(&self) -> FirewallResult<FirewallRef> {
        match (&self.firewall_arn, &self.firewall_name) {
            (Some(arn), _) => Ok(FirewallRef::Arn(arn.clone())),
            (None, Some(name)) => Ok(FirewallRef::Name(name.clone())),
            (None, None) => Err(FirewallError::from(EventError::MissingField(
                "ResourceProperties.FirewallArn".to_string(),
            ))),
        }
    }

    fn subnet_az(&self) -> FirewallResult<&str> {
        self.subnet_az.as_deref().ok_or_else(|| {
            FirewallError::from(EventError::MissingField(
                "ResourceProperties.SubnetAz".to_string(),
            ))
        })
    }
}

// ── Endpoint lookup ────────────────────────────────────────────────

/// Custom resource returning a firewall endpoint id.
pub struct EndpointResource {
    resolver: EndpointResolver,
}

impl EndpointResource {
    pub fn new(resolver: EndpointResolver) -> Self {
        Self { resolver }
    }

    /// Handle one request.
    ///
    /// Create and Update resolve the endpoint; a firewall that has not
    /// published one yet yields a success with empty `Data`. Delete has
    /// nothing to clean up. Lookup failures are returned as errors.
    pub async fn handle(&self, event: &CustomResourceEvent) -> FirewallResult<CustomResourceResponse> {
        let physical_id = event.physical_resource_id_or_new();

        if event.request_type == RequestType::Delete {
            return Ok(CustomResourceResponse::success(physical_id));
        }

        let props: EndpointProperties = event.properties()?;
        let endpoint = self
            .resolver
            .resolve_endpoint(&props.firewall_name, &props.availability_zone)
            .await?;

        let response = CustomResourceResponse::success(physical_id);
        Ok(match endpoint {
            Some(endpoint_id) => {
                info!(
                    firewall = %props.firewall_name,
                    availability_zone = %props.availability_zone,
                    %endpoint_id,
                    "returning firewall endpoint"
                );
                response.with_data(ENDPOINT_ID_KEY, endpoint_id)
            }
            None => {
                warn!(
                    firewall = %props.firewall_name,
                    availability_zone = %props.availability_zone,
                    "firewall endpoint not available"
                );
                response
            }
        })
    }
}

// ── Endpoint route ─────────────────────────────────────────────────

/// Custom resource that maintains a VPC route to a firewall endpoint.
pub struct RouteResource {
    resolver: EndpointResolver,
    routes: Arc<dyn RouteTableWriter>,
}

impl RouteResource {
    pub fn new(resolver: EndpointResolver, routes: Arc<dyn RouteTableWriter>) -> Self {
        Self { resolver, routes }
    }

    /// Handle one request.
    ///
    /// Missing properties are an `Err`. Remote failures are reported as a
    /// `FAILED` response so the stack operation fails cleanly.
    pub async fn handle(&self, event: &CustomResourceEvent) -> FirewallResult<CustomResourceResponse> {
        let physical_id = event.physical_resource_id_or_new();
        let props: RouteProperties = event.properties()?;

        match event.request_type {
            RequestType::Create => self.create(physical_id, &props).await,
            RequestType::Update => Ok(CustomResourceResponse::success(physical_id)),
            RequestType::Delete => Ok(self.delete(physical_id, &props).await),
        }
    }

    async fn create(
        &self,
        physical_id: String,
        props: &RouteProperties,
    ) -> FirewallResult<CustomResourceResponse> {
        let firewall = props.firewall()?;
        let availability_zone = props.subnet_az()?;

        let endpoint_id = match self.resolver.resolve(&firewall, availability_zone).await {
            Ok(Some(endpoint_id)) => endpoint_id,
            Ok(None) => {
                return Ok(CustomResourceResponse::failed(
                    physical_id,
                    format!("firewall endpoint not ready in {availability_zone}"),
                ));
            }
            Err(e) => {
                error!(%firewall, error = %e, "firewall lookup failed");
                return Ok(CustomResourceResponse::failed(
                    physical_id,
                    format!("Create route failed for firewall: {e}"),
                ));
            }
        };

        match self
            .routes
            .create_endpoint_route(&props.route_table_id, &props.destination_cidr, &endpoint_id)
            .await
        {
            Ok(()) => {
                info!(
                    route_table_id = %props.route_table_id,
                    destination_cidr = %props.destination_cidr,
                    %endpoint_id,
                    "created firewall route"
                );
                Ok(CustomResourceResponse::success(physical_id))
            }
            Err(e) => {
                error!(route_table_id = %props.route_table_id, error = %e, "create route failed");
                Ok(CustomResourceResponse::failed(
                    physical_id,
                    format!("Create route failed for firewall: {e}"),
                ))
            }
        }
    }

    async fn delete(&self, physical_id: String, props: &RouteProperties) -> CustomResourceResponse {
        match self
            .routes
            .delete_route(&props.route_table_id, &props.destination_cidr)
            .await
        {
            Ok(()) => {
                info!(
                    route_table_id = %props.route_table_id,
                    destination_cidr = %props.destination_cidr,
                    "deleted firewall route"
                );
                CustomResourceResponse::success(physical_id)
            }
            // Already gone.
            Err(ControlPlaneError::NotFound(_)) => CustomResourceResponse::success(physical_id),
            Err(e) => {
                error!(route_table_id = %props.route_table_id, error = %e, "delete route failed");
                CustomResourceResponse::failed(
                    physical_id,
                    format!("Delete route failed for firewall: {e}"),
                )
            }
        }
    }
}
