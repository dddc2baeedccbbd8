//! Error types for the sensor tasking subsystem
//!
//! None of these reach a requester: the orchestration boundary turns every
//! failure into a response status or a log line.

use shared_bus::TransportError;
use thiserror::Error;

/// Errors that can occur inside the sensor tasking subsystem
#[derive(Debug, Error)]
pub enum TaskingError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the cache store port
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Errors from the correlation registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("A reply for tracking id '{tracking_id}' is already awaited")]
    AlreadyPending { tracking_id: String },
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid app id: {0}")]
    InvalidAppId(String),

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn already_pending() -> Result<(), CorrelationError> {
        Err(CorrelationError::AlreadyPending {
            tracking_id: "T1".into(),
        })
    }

    fn subscribe_twice() -> Result<(), TaskingError> {
        already_pending()?;
        Ok(())
    }

    #[test]
    fn test_errors_convert_into_tasking_error() {
        let err = subscribe_twice().unwrap_err();
        assert!(matches!(err, TaskingError::Correlation(_)));
        assert_eq!(
            err.to_string(),
            "Correlation error: A reply for tracking id 'T1' is already awaited"
        );

        let err: TaskingError = TransportError::Closed.into();
        assert_eq!(err.to_string(), "Transport error: Transport closed");
    }
}
