//! tgw-handler — invocation harness for the controller.
//!
//! Takes one JSON event, works out which handler it is for, runs it, and
//! hands back the JSON response.
//!
//! ```text
//! event ──► Invocation::classify
//!             ├── source = aws.ec2           → AttachmentReconciler
//!             ├── RequestType + RouteTableId → RouteResource
//!             └── RequestType + FirewallName → EndpointResource
//! ```

pub mod dispatch;
pub mod error;
pub mod settings;

pub use dispatch::{Dispatcher, Invocation};
pub use error::{HandlerError, HandlerResult};
