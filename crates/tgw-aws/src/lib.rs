//! tgw-aws — AWS SDK implementations of the controller's collaborators.
//!
//! | Trait                     | Adapter                   | Service            |
//! |---------------------------|---------------------------|--------------------|
//! | `AttachmentControlPlane`  | [`Ec2ControlPlane`]       | EC2 (transit gw)   |
//! | `RouteTableWriter`        | [`Ec2ControlPlane`]       | EC2 (VPC routes)   |
//! | `FirewallService`         | [`NetworkFirewallService`]| Network Firewall   |
//! | (none)                    | [`CloudFormationExports`] | CloudFormation     |
//!
//! Service errors are classified into `ControlPlaneError` by error code;
//! see [`error::classify`].

pub mod ec2;
pub mod error;
pub mod exports;
pub mod firewall;

pub use ec2::Ec2ControlPlane;
pub use exports::CloudFormationExports;
pub use firewall::NetworkFirewallService;

/// Load the shared SDK configuration from the environment.
pub async fn load_config() -> aws_config::SdkConfig {
    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
}
