//! Controller configuration (TOML file + explicit overrides).
//!
//! ```toml
//! [route_tables]
//! workload = "tgw-rtb-0a1b"
//! inspection = "tgw-rtb-0c2d"
//!
//! [polling]
//! interval = "2s"
//! max_attempts = 60
//! deadline = "110s"
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::RouteTables;

/// Stack export carrying the workload route table id.
pub const WORKLOAD_EXPORT_NAME: &str = "WorkloadRouteTableId";

/// Stack export carrying the inspection route table id.
pub const INSPECTION_EXPORT_NAME: &str = "InspectionRouteTableId";

/// Delay between polls when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub route_tables: RouteTablesConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTablesConfig {
    pub workload: Option<String>,
    pub inspection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed delay between polls ("2s", "500ms", "1m").
    pub interval: Option<String>,
    /// Poll ceiling per loop; absent means poll until the state changes.
    pub max_attempts: Option<u32>,
    /// Wall-clock bound on a whole reconciliation.
    pub deadline: Option<String>,
}

impl ControllerConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(mut self, other: ControllerConfig) -> Self {
        if other.route_tables.workload.is_some() {
            self.route_tables.workload = other.route_tables.workload;
        }
        if other.route_tables.inspection.is_some() {
            self.route_tables.inspection = other.route_tables.inspection;
        }
        if other.polling.interval.is_some() {
            self.polling.interval = other.polling.interval;
        }
        if other.polling.max_attempts.is_some() {
            self.polling.max_attempts = other.polling.max_attempts;
        }
        if other.polling.deadline.is_some() {
            self.polling.deadline = other.polling.deadline;
        }
        self
    }

    /// Whether both route table ids are known.
    pub fn has_route_tables(&self) -> bool {
        self.route_tables.workload.is_some() && self.route_tables.inspection.is_some()
    }

    /// Fill unset route table ids from stack exports (name → value).
    ///
    /// Ids that are already set are left alone.
    pub fn fill_from_exports(&mut self, exports: &HashMap<String, String>) {
        if self.route_tables.workload.is_none() {
            self.route_tables.workload = exports.get(WORKLOAD_EXPORT_NAME).cloned();
        }
        if self.route_tables.inspection.is_none() {
            self.route_tables.inspection = exports.get(INSPECTION_EXPORT_NAME).cloned();
        }
    }

    pub fn route_tables(&self) -> ConfigResult<RouteTables> {
        let workload = self
            .route_tables
            .workload
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("route_tables.workload"))?;
        let inspection = self
            .route_tables
            .inspection
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("route_tables.inspection"))?;
        Ok(RouteTables::new(workload, inspection))
    }

    pub fn poll_interval(&self) -> ConfigResult<Duration> {
        match &self.polling.interval {
            None => Ok(DEFAULT_POLL_INTERVAL),
            Some(raw) => parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration {
                field: "polling.interval",
                value: raw.clone(),
            }),
        }
    }

    pub fn deadline(&self) -> ConfigResult<Option<Duration>> {
        self.polling
            .deadline
            .as_ref()
            .map(|raw| {
                parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration {
                    field: "polling.deadline",
                    value: raw.clone(),
                })
            })
            .transpose()
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
