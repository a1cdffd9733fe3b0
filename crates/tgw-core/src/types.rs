//! Domain types for transit gateway attachments and route tables.
//!
//! All of these mirror state owned by the transit gateway control plane.
//! Nothing here is persisted locally; values are snapshots of the last
//! observation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque transit gateway attachment identifier (`tgw-attach-...`).
pub type AttachmentId = String;

/// Opaque transit gateway route table identifier (`tgw-rtb-...`).
pub type RouteTableId = String;

// ── Role ───────────────────────────────────────────────────────────

/// Declared role of an attachment, set by its `routeTable` tag at
/// creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Spoke VPC whose traffic is sent through inspection.
    Workload,
    /// Hub VPC hosting the firewall.
    Inspection,
}

impl Role {
    /// Parse a raw role tag. Matching is exact.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "workload" => Some(Role::Workload),
            "inspection" => Some(Role::Inspection),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Workload => "workload",
            Role::Inspection => "inspection",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Attachment ─────────────────────────────────────────────────────

/// Lifecycle state of an attachment as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentState {
    Pending,
    Available,
    /// Any other state (`failed`, `deleting`, `rejected`, ...), kept
    /// verbatim for error reporting.
    Other(String),
}

impl AttachmentState {
    /// Map a control plane state string onto the domain state.
    pub fn from_api(raw: &str) -> Self {
        match raw {
            "pending" => AttachmentState::Pending,
            "available" => AttachmentState::Available,
            other => AttachmentState::Other(other.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AttachmentState::Pending)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AttachmentState::Available)
    }
}

impl fmt::Display for AttachmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentState::Pending => f.write_str("pending"),
            AttachmentState::Available => f.write_str("available"),
            AttachmentState::Other(s) => f.write_str(s),
        }
    }
}

/// One observation of an attachment: its state and current association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentStatus {
    pub attachment_id: AttachmentId,
    pub state: AttachmentState,
    /// Route table the attachment is bound to, if any.
    pub association: Option<RouteTableId>,
}

impl AttachmentStatus {
    pub fn new(attachment_id: &str, state: AttachmentState, association: Option<&str>) -> Self {
        Self {
            attachment_id: attachment_id.to_string(),
            state,
            association: association.map(str::to_string),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.association.is_some()
    }
}

// ── Route tables ───────────────────────────────────────────────────

/// The two transit gateway route tables an attachment can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTables {
    pub workload: RouteTableId,
    pub inspection: RouteTableId,
}

impl RouteTables {
    pub fn new(workload: &str, inspection: &str) -> Self {
        Self {
            workload: workload.to_string(),
            inspection: inspection.to_string(),
        }
    }

    /// Route table an attachment with `role` must be associated with.
    pub fn association_target(&self, role: Role) -> &str {
        match role {
            Role::Workload => &self.workload,
            Role::Inspection => &self.inspection,
        }
    }

    /// Route table that must learn the attachment's routes, if any.
    ///
    /// Workload attachments propagate into the inspection table so the
    /// firewall can route return traffic back to the spoke.
    pub fn propagation_target(&self, role: Role) -> Option<&str> {
        match role {
            Role::Workload => Some(&self.inspection),
            Role::Inspection => None,
        }
    }
}
