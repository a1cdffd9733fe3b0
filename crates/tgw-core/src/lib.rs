//! tgw-core — shared types for the transit gateway inspection controller.
//!
//! Holds the domain model (attachments, roles, route tables), the
//! controller configuration layer, and the decoders for the events that
//! trigger reconciliation and endpoint lookups.

pub mod config;
pub mod error;
pub mod event;
pub mod types;

pub use config::ControllerConfig;
pub use error::{ConfigError, ConfigResult, ControlPlaneError, ControlPlaneResult, EventError, EventResult};
pub use types::*;
