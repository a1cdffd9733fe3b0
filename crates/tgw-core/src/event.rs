//! Trigger event decoding.
//!
//! Two event families reach the controller:
//!
//! - **Attachment created**: a CloudTrail record for
//!   `CreateTransitGatewayVpcAttachment`, delivered through EventBridge.
//!   Carries the new attachment id and its `routeTable` role tag.
//! - **Custom resource**: a CloudFormation custom resource request used
//!   by stacks that need a firewall endpoint id (or a route to one).
//!
//! Decoding never touches the network; every malformed input is rejected
//! here before any remote call is made.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EventError, EventResult};

/// CloudTrail event name that triggers reconciliation.
pub const CREATE_VPC_ATTACHMENT_EVENT: &str = "CreateTransitGatewayVpcAttachment";

/// Tag key carrying the attachment role.
pub const ROLE_TAG_KEY: &str = "routeTable";

const EVENT_NAME_PATH: &str = "/detail/eventName";
const TAG_PATH: &str =
    "/detail/requestParameters/CreateTransitGatewayVpcAttachmentRequest/TagSpecifications/Tag";
const ATTACHMENT_ID_PATH: &str = "/detail/responseElements/CreateTransitGatewayVpcAttachmentResponse/transitGatewayVpcAttachment/transitGatewayAttachmentId";

// ── Attachment created ─────────────────────────────────────────────

/// A decoded attachment-created notification.
///
/// The role is kept raw; validating it against the known roles is the
/// reconciler's job so the failure surfaces as invalid input rather than
/// a malformed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentCreated {
    pub attachment_id: String,
    pub role: String,
}

impl AttachmentCreated {
    pub fn from_json(raw: &str) -> EventResult<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| EventError::Invalid(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(event: &Value) -> EventResult<Self> {
        let event_name = string_at(event, EVENT_NAME_PATH)?;
        if event_name != CREATE_VPC_ATTACHMENT_EVENT {
            return Err(EventError::UnexpectedEvent(event_name.to_string()));
        }

        let tag = event
            .pointer(TAG_PATH)
            .ok_or_else(|| missing(TAG_PATH))?;
        let role = role_from_tag(tag)?;
        let attachment_id = string_at(event, ATTACHMENT_ID_PATH)?;
        if attachment_id.is_empty() {
            return Err(missing(ATTACHMENT_ID_PATH));
        }

        Ok(Self {
            attachment_id: attachment_id.to_string(),
            role: role.to_string(),
        })
    }
}

/// CloudTrail renders a single tag as an object and several as a list.
/// A list must carry the `routeTable` key; no other tag stands in for it.
fn role_from_tag(tag: &Value) -> EventResult<&str> {
    let chosen = match tag {
        Value::Array(tags) => tags
            .iter()
            .find(|t| t.get("Key").and_then(Value::as_str) == Some(ROLE_TAG_KEY))
            .ok_or_else(|| missing(TAG_PATH))?,
        other => other,
    };

    chosen
        .get("Value")
        .and_then(Value::as_str)
        .ok_or_else(|| missing(&format!("{TAG_PATH}/Value")))
}

fn string_at<'a>(event: &'a Value, path: &str) -> EventResult<&'a str> {
    event
        .pointer(path)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(path))
}

fn missing(path: &str) -> EventError {
    EventError::MissingField(path.trim_start_matches('/').replace('/', "."))
}

// ── Custom resource ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// A CloudFormation custom resource request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Value,
}

impl CustomResourceEvent {
    pub fn from_value(event: Value) -> EventResult<Self> {
        serde_json::from_value(event).map_err(|e| EventError::Invalid(e.to_string()))
    }

    /// Decode `ResourceProperties` into a typed property set.
    pub fn properties<P: DeserializeOwned>(&self) -> EventResult<P> {
        serde_json::from_value(self.resource_properties.clone()).map_err(|e| {
            EventError::Invalid(format!("ResourceProperties: {e}"))
        })
    }

    /// Whether `ResourceProperties` carries a non-null `key`.
    pub fn has_property(&self, key: &str) -> bool {
        self.resource_properties
            .get(key)
            .is_some_and(|v| !v.is_null())
    }

    /// The physical id to report: the incoming one on Update/Delete, a
    /// fresh id on Create.
    pub fn physical_resource_id_or_new(&self) -> String {
        self.physical_resource_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Response returned for a custom resource request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub physical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl CustomResourceResponse {
    pub fn success(physical_resource_id: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            physical_resource_id,
            reason: None,
            data: BTreeMap::new(),
        }
    }

    pub fn failed(physical_resource_id: String, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            status: ResponseStatus::Failed,
            physical_resource_id,
            data: BTreeMap::from([("Error".to_string(), reason.clone())]),
            reason: Some(reason),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
