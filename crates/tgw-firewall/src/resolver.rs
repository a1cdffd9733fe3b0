//! Finds a firewall's endpoint in one zone.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::FirewallResult;
use crate::service::{FirewallDescription, FirewallRef, FirewallService};

/// Resolves `(firewall, availability zone)` to the firewall endpoint id.
#[derive(Clone)]
pub struct EndpointResolver {
    service: Arc<dyn FirewallService>,
}

impl EndpointResolver {
    pub fn new(service: Arc<dyn FirewallService>) -> Self {
        Self { service }
    }

    /// Look up the endpoint of the firewall named `firewall_name` in
    /// `availability_zone`.
    ///
    /// `Ok(None)` means the firewall exists but has not published an
    /// endpoint for that zone yet; callers retry later. A missing firewall
    /// or a service failure is an `Err`.
    pub async fn resolve_endpoint(
        &self,
        firewall_name: &str,
        availability_zone: &str,
    ) -> FirewallResult<Option<String>> {
        self.resolve(&FirewallRef::Name(firewall_name.to_string()), availability_zone)
            .await
    }

    /// Same as [`Self::resolve_endpoint`] for a firewall addressed by name
    /// or ARN.
    #[instrument(skip(self, firewall), fields(firewall = %firewall))]
    pub async fn resolve(
        &self,
        firewall: &FirewallRef,
        availability_zone: &str,
    ) -> FirewallResult<Option<String>> {
        let description = self.service.describe_firewall(firewall).await?;
        let endpoint = endpoint_in_zone(&description, availability_zone);

        match &endpoint {
            Some(endpoint_id) => debug!(%availability_zone, %endpoint_id, "resolved firewall endpoint"),
            None => debug!(%availability_zone, "firewall endpoint not published yet"),
        }
        Ok(endpoint)
    }
}

/// Walk status → sync states → zone → attachment → endpoint id, stopping
/// at the first missing link.
pub fn endpoint_in_zone(description: &FirewallDescription, availability_zone: &str) -> Option<String> {
    description
        .firewall_status
        .as_ref()?
        .sync_states
        .as_ref()?
        .get(availability_zone)?
        .attachment
        .as_ref()?
        .endpoint_id
        .clone()
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FirewallError;
    use crate::service::MockFirewallService;
    use serde_json::json;

    fn description(value: serde_json::Value) -> FirewallDescription {
        serde_json::from_value(value).unwrap()
    }

    fn converged() -> FirewallDescription {
        description(json!({
            "FirewallStatus": {
                "Status": "READY",
                "SyncStates": {
                    "us-west-2a": {
                        "Attachment": {
                            "SubnetId": "subnet-a",
                            "EndpointId": "vpce-0aaa",
                            "Status": "READY"
                        }
                    },
                    "us-west-2b": {
                        "Attachment": {
                            "SubnetId": "subnet-b",
                            "EndpointId": "vpce-0bbb",
                            "Status": "READY"
                        }
                    }
                }
            }
        }))
    }

    fn resolver_returning(desc: FirewallDescription) -> EndpointResolver {
        let mut mock = MockFirewallService::new();
        mock.expect_describe_firewall()
            .times(1)
            .returning(move |fw| {
                assert_eq!(fw, &FirewallRef::Name("fw1".to_string()));
                Ok(desc.clone())
            });
        EndpointResolver::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn complete_record_resolves() {
        let resolver = resolver_returning(converged());
        let endpoint = resolver.resolve_endpoint("fw1", "us-west-2a").await.unwrap();
        assert_eq!(endpoint.as_deref(), Some("vpce-0aaa"));
    }

    #[tokio::test]
    async fn missing_attachment_is_absent() {
        let resolver = resolver_returning(description(json!({
            "FirewallStatus": {
                "Status": "PROVISIONING",
                "SyncStates": { "us-west-2a": {} }
            }
        })));
        let endpoint = resolver.resolve_endpoint("fw1", "us-west-2a").await.unwrap();
        assert_eq!(endpoint, None);
    }

    #[tokio::test]
    async fn unknown_zone_is_absent() {
        let resolver = resolver_returning(converged());
        let endpoint = resolver.resolve_endpoint("fw1", "us-west-2c").await.unwrap();
        assert_eq!(endpoint, None);
    }

    #[tokio::test]
    async fn firewall_without_status_is_absent() {
        let resolver = resolver_returning(FirewallDescription::default());
        assert_eq!(resolver.resolve_endpoint("fw1", "us-west-2a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_firewall_is_an_error() {
        let mut mock = MockFirewallService::new();
        mock.expect_describe_firewall()
            .times(1)
            .returning(|fw| Err(FirewallError::NotFound(fw.to_string())));
        let resolver = EndpointResolver::new(Arc::new(mock));

        let err = resolver.resolve_endpoint("fw1", "us-west-2a").await.unwrap_err();
        assert!(matches!(err, FirewallError::NotFound(name) if name == "fw1"));
    }

    #[test]
    fn endpoint_chain_stops_at_first_gap() {
        let no_endpoint = description(json!({
            "FirewallStatus": {
                "SyncStates": { "us-west-2a": { "Attachment": { "SubnetId": "subnet-a" } } }
            }
        }));
        assert_eq!(endpoint_in_zone(&no_endpoint, "us-west-2a"), None);

        let no_sync_states = description(json!({ "FirewallStatus": { "Status": "PROVISIONING" } }));
        assert_eq!(endpoint_in_zone(&no_sync_states, "us-west-2a"), None);

        assert_eq!(
            endpoint_in_zone(&converged(), "us-west-2b").as_deref(),
            Some("vpce-0bbb")
        );
    }
}
