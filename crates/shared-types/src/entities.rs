//! # Core Message Entities
//!
//! Headers, status codes, and the `Tracked` accessor trait shared by every
//! request/response message on the bus.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Outcome status carried by every response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusCode {
    /// The request was carried out.
    Successful,
    /// The requester is not authenticated.
    Unauthorized,
    /// The requester is not permitted to perform the request.
    Forbidden,
    /// The target (e.g. a sensor) does not exist.
    NotFound,
    /// A non-specific failure.
    GeneralFailure,
    /// Health probe reply: healthy.
    Healthy,
    /// Health probe reply: ready.
    Ready,
    /// The request was accepted and is still being worked.
    Pending,
    /// Data is being transmitted.
    Transmitting,
    /// The request does not apply to the target.
    NotApplicable,
    /// The request was refused without being attempted.
    Rejected,
    /// The message is itself a request.
    Request,
    /// A required service is unavailable.
    ServiceUnavailable,
    /// No reply arrived within the allowed wait.
    Timeout,
    /// An internal failure in the responding service.
    InternalServiceError,
    /// The request carried an invalid argument.
    InvalidArgument,
    /// Status not set.
    #[default]
    Unknown,
}

impl StatusCode {
    /// Returns true only for [`StatusCode::Successful`].
    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(self, StatusCode::Successful)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Header attached to every request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Unique per request instance. Generated by the ultimate requester.
    pub tracking_id: String,
    /// Groups a causally related chain of requests and replies.
    pub correlation_id: String,
    /// Application id of the requester as stated in the payload.
    pub app_id: String,
}

impl RequestHeader {
    /// Create a header with freshly generated tracking and correlation ids.
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            tracking_id: Uuid::new_v4().to_string(),
            correlation_id: Uuid::new_v4().to_string(),
            app_id: app_id.into(),
        }
    }

    /// Create a header with explicit ids.
    #[must_use]
    pub fn with_ids(
        tracking_id: impl Into<String>,
        correlation_id: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            correlation_id: correlation_id.into(),
            app_id: app_id.into(),
        }
    }
}

/// Header attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Echoes the tracking id of the request being answered.
    pub tracking_id: String,
    /// Echoes the correlation id of the request being answered.
    pub correlation_id: String,
    /// Application id the response concerns.
    pub app_id: String,
    /// Outcome.
    pub status: StatusCode,
    /// Human-readable detail.
    pub message: String,
}

impl ResponseHeader {
    /// Build a response header answering `request` with the given outcome.
    #[must_use]
    pub fn answering(request: &RequestHeader, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            tracking_id: request.tracking_id.clone(),
            correlation_id: request.correlation_id.clone(),
            app_id: request.app_id.clone(),
            status,
            message: message.into(),
        }
    }
}

/// Access to the tracking and correlation ids of a message.
pub trait Tracked {
    /// Unique id of the request instance this message belongs to.
    fn tracking_id(&self) -> &str;

    /// Id of the causal chain this message belongs to.
    fn correlation_id(&self) -> &str;
}

impl Tracked for RequestHeader {
    fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

impl Tracked for ResponseHeader {
    fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}
