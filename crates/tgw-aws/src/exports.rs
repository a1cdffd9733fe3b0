//! CloudFormation exports, used as a fallback source of route table ids.

use std::collections::HashMap;

use aws_sdk_cloudformation::Client;
use tracing::debug;

use tgw_core::ControlPlaneResult;

use crate::error::classify;

#[derive(Debug, Clone)]
pub struct CloudFormationExports {
    client: Client,
}

impl CloudFormationExports {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }

    /// All exports in the region, by export name.
    pub async fn list(&self) -> ControlPlaneResult<HashMap<String, String>> {
        let mut exports = HashMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_exports()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(classify)?;

            for export in output.exports() {
                if let (Some(name), Some(value)) = (export.name(), export.value()) {
                    exports.insert(name.to_string(), value.to_string());
                }
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = exports.len(), "listed stack exports");
        Ok(exports)
    }
}
