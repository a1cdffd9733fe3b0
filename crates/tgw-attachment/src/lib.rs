//! tgw-attachment — drives a transit gateway attachment to its target
//! route table.
//!
//! When a VPC attachment is created, this crate binds it to the route
//! table selected by its role tag and, for workload attachments, turns on
//! propagation into the inspection route table.
//!
//! # Flow
//!
//! ```text
//! AttachmentReconciler::reconcile(id, role)
//!   ├── validate role                      (no remote calls on failure)
//!   ├── reader::describe                   → AttachmentStatus
//!   ├── waiter::wait_until_settled         (only while pending)
//!   ├── require available
//!   ├── disassociate::disassociate_until_clear   (only while bound)
//!   └── driver::associate_and_propagate
//! ```
//!
//! The crate keeps no state between runs. Every decision is made on a
//! fresh read from the control plane, so re-running a reconciliation for
//! the same attachment converges on the same bindings.

pub mod control_plane;
pub mod disassociate;
pub mod driver;
pub mod error;
pub mod poll;
pub mod reader;
pub mod reconciler;
pub mod waiter;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use control_plane::AttachmentControlPlane;
pub use error::{ReconcileError, ReconcileResult};
pub use poll::PollPolicy;
pub use reconciler::{AttachmentReconciler, ReconcileOutcome};
