//! tgw-firewall — firewall endpoint lookups for route building.
//!
//! A managed firewall publishes one endpoint per availability zone, but
//! only after the firewall has converged. Routes that send traffic
//! through inspection need that endpoint id as their target.
//!
//! # Components
//!
//! - **`service`**: the firewall description as reported by the service
//! - **`resolver`**: `(firewall, zone) → endpoint id | absent`
//! - **`routes`**: VPC route writes targeting an endpoint
//! - **`custom_resource`**: CloudFormation custom resource handlers for
//!   endpoint lookups and endpoint routes

pub mod custom_resource;
pub mod error;
pub mod resolver;
pub mod routes;
pub mod service;

pub use custom_resource::{EndpointResource, RouteResource};
pub use error::{FirewallError, FirewallResult};
pub use resolver::EndpointResolver;
pub use routes::RouteTableWriter;
pub use service::{FirewallDescription, FirewallRef, FirewallService};
