//! # Sensor Message Payloads
//!
//! Request/response pairs exchanged between client apps, the sensor host
//! service, and the downstream tasking platform, plus unsolicited `SensorData`.
//!
//! ## Design Rules
//!
//! - All payloads travel inside an `Envelope<T>`.
//! - A response echoes the `tracking_id` of the request it answers; that is the
//!   only field used to correlate the two.

use crate::entities::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// TASKING
// =============================================================================

/// Ask a sensor to perform work (e.g. capture data).
/// Sender: client app | Receiver: sensor host, then downstream platform
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskingRequest {
    /// Request header.
    pub request_header: RequestHeader,
    /// Sensor being tasked.
    pub sensor_id: String,
    /// Unix time (ms) at which the tasking should start, if scheduled.
    pub request_time: Option<u64>,
    /// Unix time (ms) after which the tasking is void.
    pub expiration_time: Option<u64>,
    /// Sensor-specific tasking parameters.
    pub data: Option<serde_json::Value>,
}

impl TaskingRequest {
    /// Create a tasking request for `sensor_id` from `app_id`.
    #[must_use]
    pub fn new(app_id: impl Into<String>, sensor_id: impl Into<String>) -> Self {
        Self {
            request_header: RequestHeader::new(app_id),
            sensor_id: sensor_id.into(),
            ..Self::default()
        }
    }
}

/// Reply to a [`TaskingRequest`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskingResponse {
    /// Response header.
    pub response_header: ResponseHeader,
    /// Echo of the tasked sensor.
    pub sensor_id: String,
}

impl TaskingResponse {
    /// Build a response answering `request` with the given outcome.
    #[must_use]
    pub fn answering(request: &TaskingRequest, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            response_header: ResponseHeader::answering(&request.request_header, status, message),
            sensor_id: request.sensor_id.clone(),
        }
    }
}

// =============================================================================
// TASKING PRE-CHECK
// =============================================================================

/// Ask whether a tasking would be accepted, without performing it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskingPreCheckRequest {
    /// Request header.
    pub request_header: RequestHeader,
    /// Sensor the tasking would target.
    pub sensor_id: String,
    /// Unix time (ms) at which the tasking would start.
    pub request_time: Option<u64>,
    /// Sensor-specific tasking parameters.
    pub data: Option<serde_json::Value>,
}

impl TaskingPreCheckRequest {
    /// Create a pre-check request for `sensor_id` from `app_id`.
    #[must_use]
    pub fn new(app_id: impl Into<String>, sensor_id: impl Into<String>) -> Self {
        Self {
            request_header: RequestHeader::new(app_id),
            sensor_id: sensor_id.into(),
            ..Self::default()
        }
    }
}

/// Reply to a [`TaskingPreCheckRequest`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskingPreCheckResponse {
    /// Response header.
    pub response_header: ResponseHeader,
    /// Echo of the sensor.
    pub sensor_id: String,
}

impl TaskingPreCheckResponse {
    /// Build a response answering `request` with the given outcome.
    #[must_use]
    pub fn answering(
        request: &TaskingPreCheckRequest,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            response_header: ResponseHeader::answering(&request.request_header, status, message),
            sensor_id: request.sensor_id.clone(),
        }
    }
}

// =============================================================================
// SENSOR DATA
// =============================================================================

/// Data produced by a sensor, either as a direct reply or as an unsolicited
/// broadcast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorData {
    /// Response header.
    pub response_header: ResponseHeader,
    /// Sensor that produced the data.
    pub sensor_id: String,
    /// Explicit recipient. `None` means broadcast to the sensor's subscribers.
    pub destination_app_id: Option<String>,
    /// Unix time (ms) the data was generated.
    pub generated_time: Option<u64>,
    /// Unix time (ms) after which the data is stale.
    pub expiration_time: Option<u64>,
    /// Sensor payload.
    pub data: serde_json::Value,
}

// =============================================================================
// TRACKED IMPLS
// =============================================================================

macro_rules! impl_tracked {
    ($ty:ty, $header:ident) => {
        impl Tracked for $ty {
            fn tracking_id(&self) -> &str {
                &self.$header.tracking_id
            }

            fn correlation_id(&self) -> &str {
                &self.$header.correlation_id
            }
        }
    };
}

impl_tracked!(TaskingRequest, request_header);
impl_tracked!(TaskingResponse, response_header);
impl_tracked!(TaskingPreCheckRequest, request_header);
impl_tracked!(TaskingPreCheckResponse, response_header);
impl_tracked!(SensorData, response_header);
