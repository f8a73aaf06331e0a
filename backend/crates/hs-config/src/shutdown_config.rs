use crate::{ConfigError, ConfigErrorResult, DEFAULT_FORCE_TIMEOUT_MS, DEFAULT_GRACE_PERIOD_MS};

use std::time::Duration;

use serde::Deserialize;

/// Two-phase stop budget handed to the embedded server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight requests may finish after a stop request
    pub grace_period_ms: u64,
    /// Deadline (from the stop request) after which serving is aborted
    pub force_timeout_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            force_timeout_ms: DEFAULT_FORCE_TIMEOUT_MS,
        }
    }
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn force_timeout(&self) -> Duration {
        Duration::from_millis(self.force_timeout_ms)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.force_timeout_ms < self.grace_period_ms {
            return Err(ConfigError::shutdown(format!(
                "shutdown.force_timeout_ms ({}) must be >= shutdown.grace_period_ms ({})",
                self.force_timeout_ms, self.grace_period_ms
            )));
        }

        Ok(())
    }
}
