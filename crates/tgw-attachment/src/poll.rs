//! Fixed-delay polling policy shared by the waiter and the
//! disassociation loop.

use std::time::Duration;

use tgw_core::{ConfigResult, ControllerConfig};

/// How often, and how many times, a loop polls the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each poll.
    pub interval: Duration,
    /// Maximum polls per loop; `None` polls until the state changes.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: tgw_core::config::DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> ConfigResult<Self> {
        Ok(Self {
            interval: config.poll_interval()?,
            max_attempts: config.polling.max_attempts,
        })
    }

    /// Whether `attempts` polls have used up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Sleep for one interval.
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
