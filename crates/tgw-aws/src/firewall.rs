//! Network Firewall adapter.

use async_trait::async_trait;
use aws_sdk_networkfirewall::Client;
use aws_sdk_networkfirewall::error::DisplayErrorContext;
use aws_sdk_networkfirewall::types as nfw;

use tgw_firewall::service::{EndpointAttachment, FirewallStatus, SyncState};
use tgw_firewall::{FirewallDescription, FirewallError, FirewallRef, FirewallResult, FirewallService};

#[derive(Debug, Clone)]
pub struct NetworkFirewallService {
    client: Client,
}

impl NetworkFirewallService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

fn to_status(status: &nfw::FirewallStatus) -> FirewallStatus {
    let sync_states = status.sync_states().map(|states| {
        states
            .iter()
            .map(|(zone, state)| {
                let attachment = state.attachment().map(|a| EndpointAttachment {
                    subnet_id: a.subnet_id().map(str::to_string),
                    endpoint_id: a.endpoint_id().map(str::to_string),
                });
                (zone.clone(), SyncState { attachment })
            })
            .collect()
    });
    FirewallStatus { sync_states }
}

#[async_trait]
impl FirewallService for NetworkFirewallService {
    async fn describe_firewall(&self, firewall: &FirewallRef) -> FirewallResult<FirewallDescription> {
        let request = match firewall {
            FirewallRef::Name(name) => self.client.describe_firewall().firewall_name(name),
            FirewallRef::Arn(arn) => self.client.describe_firewall().firewall_arn(arn),
        };

        let output = request.send().await.map_err(|err| {
            let not_found = err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception());
            if not_found {
                FirewallError::NotFound(firewall.to_string())
            } else {
                FirewallError::Service(DisplayErrorContext(&err).to_string())
            }
        })?;

        Ok(FirewallDescription {
            firewall_status: output.firewall_status().map(to_status),
        })
    }
}

