//! EC2 adapter: transit gateway attachments and VPC routes.

use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::types::{TransitGatewayAssociationState, TransitGatewayAttachment};
use tracing::debug;

use tgw_attachment::AttachmentControlPlane;
use tgw_core::{AttachmentState, AttachmentStatus, ControlPlaneError, ControlPlaneResult};
use tgw_firewall::RouteTableWriter;

use crate::error::classify;

#[derive(Debug, Clone)]
pub struct Ec2ControlPlane {
    client: Client,
}

impl Ec2ControlPlane {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

/// Project an SDK attachment onto the domain status.
///
/// An association that has finished disassociating no longer binds the
/// attachment.
fn to_status(attachment_id: &str, attachment: &TransitGatewayAttachment) -> AttachmentStatus {
    let state = attachment
        .state()
        .map(|s| AttachmentState::from_api(s.as_str()))
        .unwrap_or_else(|| AttachmentState::Other("unknown".to_string()));

    let association = attachment
        .association()
        .filter(|a| a.state() != Some(&TransitGatewayAssociationState::Disassociated))
        .and_then(|a| a.transit_gateway_route_table_id());

    AttachmentStatus::new(attachment_id, state, association)
}

#[async_trait]
impl AttachmentControlPlane for Ec2ControlPlane {
    async fn describe_attachment(
        &self,
        attachment_id: &str,
    ) -> ControlPlaneResult<Option<AttachmentStatus>> {
        let output = match self
            .client
            .describe_transit_gateway_attachments()
            .transit_gateway_attachment_ids(attachment_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return match classify(e) {
                    ControlPlaneError::NotFound(_) => Ok(None),
                    other => Err(other),
                };
            }
        };

        let status = output
            .transit_gateway_attachments()
            .iter()
            .find(|a| a.transit_gateway_attachment_id() == Some(attachment_id))
            .map(|a| to_status(attachment_id, a));

        debug!(attachment_id, found = status.is_some(), "described attachment");
        Ok(status)
    }

    async fn associate_route_table(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()> {
        self.client
            .associate_transit_gateway_route_table()
            .transit_gateway_attachment_id(attachment_id)
            .transit_gateway_route_table_id(route_table_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn disassociate_route_table(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()> {
        self.client
            .disassociate_transit_gateway_route_table()
            .transit_gateway_attachment_id(attachment_id)
            .transit_gateway_route_table_id(route_table_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn enable_route_propagation(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()> {
        self.client
            .enable_transit_gateway_route_table_propagation()
            .transit_gateway_attachment_id(attachment_id)
            .transit_gateway_route_table_id(route_table_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[async_trait]
impl RouteTableWriter for Ec2ControlPlane {
    async fn create_endpoint_route(
        &self,
        route_table_id: &str,
        destination_cidr: &str,
        endpoint_id: &str,
    ) -> ControlPlaneResult<()> {
        self.client
            .create_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr)
            .vpc_endpoint_id(endpoint_id)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_route(&self, route_table_id: &str, destination_cidr: &str) -> ControlPlaneResult<()> {
        self.client
            .delete_route()
            .route_table_id(route_table_id)
            .destination_cidr_block(destination_cidr)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}
