//! The firewall service, as seen by the resolver.
//!
//! The description types keep every level optional, matching what the
//! service returns while a firewall is still converging.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::error::FirewallResult;

/// How a firewall is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirewallRef {
    Name(String),
    Arn(String),
}

impl fmt::Display for FirewallRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirewallRef::Name(name) => f.write_str(name),
            FirewallRef::Arn(arn) => f.write_str(arn),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FirewallDescription {
    #[serde(default)]
    pub firewall_status: Option<FirewallStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FirewallStatus {
    /// Availability zone → per-zone synchronization state.
    #[serde(default)]
    pub sync_states: Option<HashMap<String, SyncState>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncState {
    #[serde(default)]
    pub attachment: Option<EndpointAttachment>,
}

/// The firewall's attachment to a subnet in one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointAttachment {
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub endpoint_id: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait FirewallService: Send + Sync {
    /// Describe a firewall.
    ///
    /// Fails with [`crate::FirewallError::NotFound`] when no such firewall
    /// exists.
    async fn describe_firewall(&self, firewall: &FirewallRef) -> FirewallResult<FirewallDescription>;
}
