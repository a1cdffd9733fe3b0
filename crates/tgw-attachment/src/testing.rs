//! Scripted in-memory control plane for tests.
//!
//! Each `describe_attachment` consumes the next scripted observation; the
//! last one repeats forever. Every call is recorded so tests can assert
//! on exactly what the reconciler asked the control plane to do.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use tgw_core::{AttachmentState, AttachmentStatus, ControlPlaneError, ControlPlaneResult};

use crate::control_plane::AttachmentControlPlane;

/// A control plane request, as recorded by [`ScriptedControlPlane`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(String),
    Associate {
        attachment_id: String,
        route_table_id: String,
    },
    Disassociate {
        attachment_id: String,
        route_table_id: String,
    },
    EnablePropagation {
        attachment_id: String,
        route_table_id: String,
    },
}

#[derive(Default)]
struct Script {
    observations: VecDeque<Option<AttachmentStatus>>,
    calls: Vec<Call>,
    disassociate_errors: VecDeque<ControlPlaneError>,
    associate_error: Option<ControlPlaneError>,
    propagation_error: Option<ControlPlaneError>,
}

pub struct ScriptedControlPlane {
    script: Mutex<Script>,
}

impl ScriptedControlPlane {
    /// Replay `observations` in order, repeating the last.
    pub fn new(observations: impl IntoIterator<Item = AttachmentStatus>) -> Self {
        let observations: VecDeque<_> = observations.into_iter().map(Some).collect();
        assert!(!observations.is_empty(), "script needs at least one observation");
        Self {
            script: Mutex::new(Script {
                observations,
                ..Default::default()
            }),
        }
    }

    /// A control plane that has never heard of the attachment.
    pub fn missing() -> Self {
        Self {
            script: Mutex::new(Script {
                observations: VecDeque::from([None]),
                ..Default::default()
            }),
        }
    }

    pub fn fail_association(self, err: ControlPlaneError) -> Self {
        self.with_script(|s| s.associate_error = Some(err))
    }

    pub fn fail_propagation(self, err: ControlPlaneError) -> Self {
        self.with_script(|s| s.propagation_error = Some(err))
    }

    /// Fail the next disassociate request with `err`, then succeed.
    pub fn fail_disassociation_once(self, err: ControlPlaneError) -> Self {
        self.with_script(|s| s.disassociate_errors.push_back(err))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn describe_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Describe(_)))
    }

    pub fn disassociate_count(&self) -> usize {
        self.count(|c| matches!(c, Call::Disassociate { .. }))
    }

    /// Route tables passed to associate calls, in order.
    pub fn associated_with(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Associate { route_table_id, .. } => Some(route_table_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Route tables passed to enable-propagation calls, in order.
    pub fn propagated_to(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::EnablePropagation { route_table_id, .. } => Some(route_table_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Calls other than describes.
    pub fn mutations(&self) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| !matches!(c, Call::Describe(_)))
            .cloned()
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn with_script(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut self.lock());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("script lock poisoned")
    }
}

#[async_trait]
impl AttachmentControlPlane for ScriptedControlPlane {
    async fn describe_attachment(
        &self,
        attachment_id: &str,
    ) -> ControlPlaneResult<Option<AttachmentStatus>> {
        let mut script = self.lock();
        script.calls.push(Call::Describe(attachment_id.to_string()));
        let next = if script.observations.len() > 1 {
            script.observations.pop_front().flatten()
        } else {
            script.observations.front().cloned().flatten()
        };
        Ok(next)
    }

    async fn associate_route_table(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()> {
        let mut script = self.lock();
        script.calls.push(Call::Associate {
            attachment_id: attachment_id.to_string(),
            route_table_id: route_table_id.to_string(),
        });
        match script.associate_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn disassociate_route_table(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()> {
        let mut script = self.lock();
        script.calls.push(Call::Disassociate {
            attachment_id: attachment_id.to_string(),
            route_table_id: route_table_id.to_string(),
        });
        match script.disassociate_errors.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn enable_route_propagation(
        &self,
        attachment_id: &str,
        route_table_id: &str,
    ) -> ControlPlaneResult<()> {
        let mut script = self.lock();
        script.calls.push(Call::EnablePropagation {
            attachment_id: attachment_id.to_string(),
            route_table_id: route_table_id.to_string(),
        });
        match script.propagation_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Shorthand for an available attachment.
pub fn available(attachment_id: &str, association: Option<&str>) -> AttachmentStatus {
    AttachmentStatus::new(attachment_id, AttachmentState::Available, association)
}

/// Shorthand for a pending attachment.
pub fn pending(attachment_id: &str) -> AttachmentStatus {
    AttachmentStatus::new(attachment_id, AttachmentState::Pending, None)
}
