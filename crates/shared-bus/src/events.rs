//! # Host Messages
//!
//! Defines every message type that flows through the bus.
//! These wrap the payloads in `shared-types/src/ipc.rs`.

use serde::{Deserialize, Serialize};
use shared_types::{
    SensorData, TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest,
    TaskingResponse, Tracked,
};

use crate::Delivery;

/// All messages that can be delivered on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostMessage {
    // =========================================================================
    // TASKING
    // =========================================================================
    /// Source: client app | Target: sensor host, then downstream platform
    TaskingRequest(TaskingRequest),

    /// Source: downstream platform | Target: sensor host, then client app
    TaskingResponse(TaskingResponse),

    // =========================================================================
    // TASKING PRE-CHECK
    // =========================================================================
    /// Source: client app | Target: sensor host, then downstream platform
    TaskingPreCheckRequest(TaskingPreCheckRequest),

    /// Source: downstream platform | Target: sensor host, then client app
    TaskingPreCheckResponse(TaskingPreCheckResponse),

    // =========================================================================
    // SENSOR DATA
    // =========================================================================
    /// Data produced by a sensor (direct or broadcast).
    SensorData(SensorData),
}

impl HostMessage {
    /// Get the topic for this message (for filtering).
    #[must_use]
    pub fn topic(&self) -> MessageTopic {
        match self {
            Self::TaskingRequest(_) | Self::TaskingResponse(_) => MessageTopic::Tasking,
            Self::TaskingPreCheckRequest(_) | Self::TaskingPreCheckResponse(_) => {
                MessageTopic::TaskingPreCheck
            }
            Self::SensorData(_) => MessageTopic::SensorData,
        }
    }

    /// Message type name, for logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TaskingRequest(_) => "TaskingRequest",
            Self::TaskingResponse(_) => "TaskingResponse",
            Self::TaskingPreCheckRequest(_) => "TaskingPreCheckRequest",
            Self::TaskingPreCheckResponse(_) => "TaskingPreCheckResponse",
            Self::SensorData(_) => "SensorData",
        }
    }

    /// Tracking id of the wrapped message.
    #[must_use]
    pub fn tracking_id(&self) -> &str {
        match self {
            Self::TaskingRequest(m) => m.tracking_id(),
            Self::TaskingResponse(m) => m.tracking_id(),
            Self::TaskingPreCheckRequest(m) => m.tracking_id(),
            Self::TaskingPreCheckResponse(m) => m.tracking_id(),
            Self::SensorData(m) => m.tracking_id(),
        }
    }
}

impl From<TaskingRequest> for HostMessage {
    fn from(m: TaskingRequest) -> Self {
        Self::TaskingRequest(m)
    }
}

impl From<TaskingResponse> for HostMessage {
    fn from(m: TaskingResponse) -> Self {
        Self::TaskingResponse(m)
    }
}

impl From<TaskingPreCheckRequest> for HostMessage {
    fn from(m: TaskingPreCheckRequest) -> Self {
        Self::TaskingPreCheckRequest(m)
    }
}

impl From<TaskingPreCheckResponse> for HostMessage {
    fn from(m: TaskingPreCheckResponse) -> Self {
        Self::TaskingPreCheckResponse(m)
    }
}

impl From<SensorData> for HostMessage {
    fn from(m: SensorData) -> Self {
        Self::SensorData(m)
    }
}

/// Message topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageTopic {
    /// Tasking requests and responses.
    Tasking,
    /// Tasking pre-check requests and responses.
    TaskingPreCheck,
    /// Sensor data.
    SensorData,
    /// All messages (no filtering).
    All,
}

/// Filter for subscribing to specific deliveries.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<MessageTopic>,
    /// Destination app ids to include. Empty means every destination.
    pub destinations: Vec<String>,
}

impl MessageFilter {
    /// Create a filter that accepts all deliveries.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for deliveries addressed to `app_id`.
    #[must_use]
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            topics: Vec::new(),
            destinations: vec![app_id.into()],
        }
    }

    /// Narrow the filter to specific topics.
    #[must_use]
    pub fn with_topics(mut self, topics: Vec<MessageTopic>) -> Self {
        self.topics = topics;
        self
    }

    /// Check if a delivery matches this filter.
    #[must_use]
    pub fn matches(&self, delivery: &Delivery) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&MessageTopic::All)
            || self.topics.contains(&delivery.payload.topic());

        let destination_match = self.destinations.is_empty()
            || self
                .destinations
                .iter()
                .any(|d| d == &delivery.destination_app_id);

        topic_match && destination_match
    }
}
