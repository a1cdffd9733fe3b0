//! VPC route writes that target a firewall endpoint.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use tgw_core::ControlPlaneResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RouteTableWriter: Send + Sync {
    /// Add `destination_cidr → endpoint_id` to a VPC route table.
    async fn create_endpoint_route(
        &self,
        route_table_id: &str,
        destination_cidr: &str,
        endpoint_id: &str,
    ) -> ControlPlaneResult<()>;

    /// Remove the route for `destination_cidr` from a VPC route table.
    async fn delete_route(&self, route_table_id: &str, destination_cidr: &str) -> ControlPlaneResult<()>;
}
