//! Host configuration

use std::time::Duration;

use hs_sensor_tasking::{ConfigError, TaskingConfig};

/// How often expired cache entries are reclaimed.
pub const DEFAULT_CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Complete host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub tasking: TaskingConfig,
    pub cache_purge_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tasking: TaskingConfig::default(),
            cache_purge_interval: DEFAULT_CACHE_PURGE_INTERVAL,
        }
    }
}

impl HostConfig {
    /// Load from environment variables.
    ///
    /// See [`TaskingConfig::from_env`] for the recognized variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tasking: TaskingConfig::from_env()?,
            ..Self::default()
        })
    }

    pub fn with_tasking(mut self, tasking: TaskingConfig) -> Self {
        self.tasking = tasking;
        self
    }
}
