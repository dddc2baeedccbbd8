//! Tasking configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use hs_sensor_tasking::domain::TaskingConfig;
//! use std::time::Duration;
//!
//! let config = TaskingConfig::default()
//!     .with_max_response_wait(Duration::from_millis(500))
//!     .with_downstream_routing(false);
//! config.validate()?;
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use shared_types::app_ids;
use std::env;
use std::time::Duration;

/// How long a successful tasking stays in the outcome cache.
pub const OUTCOME_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// How long a sensor's subscription set lives after its last change.
pub const SUBSCRIPTION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key prefix for per-sensor subscription sets.
pub const SENSOR_SUBSCRIPTIONS_PREFIX: &str = "sensor-subscriptions-";

/// Sensor tasking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskingConfig {
    /// App id this service listens on
    pub host_app_id: String,
    /// App id of the downstream tasking platform
    pub downstream_app_id: String,
    /// Upper bound on the wait for a downstream reply
    #[serde(with = "humantime_serde")]
    pub max_response_wait: Duration,
    /// When false, requests are answered `Rejected` without going downstream
    pub enable_downstream_routing: bool,
    /// Expiry of the "recently tasked" record
    #[serde(with = "humantime_serde")]
    pub outcome_cache_ttl: Duration,
    /// Expiry applied each time a subscription set is written
    #[serde(with = "humantime_serde")]
    pub subscription_ttl: Duration,
    /// Prefix of subscription set cache keys
    pub subscription_key_prefix: String,
}

impl Default for TaskingConfig {
    fn default() -> Self {
        Self {
            host_app_id: app_ids::HOSTSVC_SENSOR.to_string(),
            downstream_app_id: app_ids::PLATFORM_MTS.to_string(),
            max_response_wait: Duration::from_secs(10),
            enable_downstream_routing: true,
            outcome_cache_ttl: OUTCOME_CACHE_TTL,
            subscription_ttl: SUBSCRIPTION_TTL,
            subscription_key_prefix: SENSOR_SUBSCRIPTIONS_PREFIX.to_string(),
        }
    }
}

impl TaskingConfig {
    /// Defaults overridden from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HOST_APP_ID`: App id this service listens on
    /// - `HOST_DOWNSTREAM_APP_ID`: Downstream platform app id
    /// - `HOST_MESSAGE_RESPONSE_TIMEOUT_MS`: Max wait for a downstream reply
    /// - `HOST_ENABLE_ROUTING_TO_MTS`: `true`/`false`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(app_id) = env::var("HOST_APP_ID") {
            config.host_app_id = app_id;
        }
        if let Ok(app_id) = env::var("HOST_DOWNSTREAM_APP_ID") {
            config.downstream_app_id = app_id;
        }
        if let Ok(value) = env::var("HOST_MESSAGE_RESPONSE_TIMEOUT_MS") {
            let millis: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "HOST_MESSAGE_RESPONSE_TIMEOUT_MS".into(),
                value: value.clone(),
            })?;
            config.max_response_wait = Duration::from_millis(millis);
        }
        if let Ok(value) = env::var("HOST_ENABLE_ROUTING_TO_MTS") {
            config.enable_downstream_routing = parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidEnv {
                    var: "HOST_ENABLE_ROUTING_TO_MTS".into(),
                    value: value.clone(),
                }
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_response_wait.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "max_response_wait cannot be 0".into(),
            ));
        }
        if self.host_app_id.trim().is_empty() {
            return Err(ConfigError::InvalidAppId("host_app_id cannot be empty".into()));
        }
        if self.downstream_app_id.trim().is_empty() {
            return Err(ConfigError::InvalidAppId(
                "downstream_app_id cannot be empty".into(),
            ));
        }
        if self.host_app_id == self.downstream_app_id {
            return Err(ConfigError::InvalidAppId(
                "host_app_id and downstream_app_id must differ".into(),
            ));
        }
        Ok(())
    }

    /// Builder-style method to set the downstream reply wait
    pub fn with_max_response_wait(mut self, wait: Duration) -> Self {
        self.max_response_wait = wait;
        self
    }

    /// Builder-style method to enable or disable downstream routing
    pub fn with_downstream_routing(mut self, enabled: bool) -> Self {
        self.enable_downstream_routing = enabled;
        self
    }

    /// Builder-style method to set the host app id
    pub fn with_host_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.host_app_id = app_id.into();
        self
    }

    /// Cache key of the subscription set for `sensor_id`
    pub fn subscription_key(&self, sensor_id: &str) -> String {
        format!("{}{}", self.subscription_key_prefix, sensor_id)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
