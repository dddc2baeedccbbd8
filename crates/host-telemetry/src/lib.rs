//! # Host Telemetry
//!
//! Structured logging for host services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use host_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Logs are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HOST_SERVICE_NAME` | `hostsvc-sensor` | Service name stamped on every line |
//! | `HOST_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `HOST_JSON_LOGS` | `true` in containers | JSON formatted output |
//! | `HOST_CONSOLE_OUTPUT` | `true` | Emit to stdout at all |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

#[doc(hidden)]
pub use tracing;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
}

/// Initialize structured logging for the process.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        log_level = %config.log_level,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// Log an event about a tracked message with the standard correlation fields.
///
/// # Example
///
/// ```rust,ignore
/// use host_telemetry::log_tracked_event;
///
/// log_tracked_event!(info, "Processing message", "T1", "C1", source_app = "app-a");
/// ```
#[macro_export]
macro_rules! log_tracked_event {
    ($level:ident, $msg:expr, $tracking_id:expr, $correlation_id:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            tracking_id = %$tracking_id,
            correlation_id = %$correlation_id,
            $($($field)*,)?
            $msg
        )
    };
}
