//! Inbound Ports (Driving Ports)
//!
//! The API the bus adapter drives. Every method is infallible from the
//! caller's point of view: failures become reply statuses or log lines.

use async_trait::async_trait;
use shared_types::{
    SensorData, TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest,
    TaskingResponse,
};

use crate::domain::Disposition;

/// Result of routing one piece of sensor data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorDataRouting {
    /// A plugin vetoed the data.
    Dropped,
    /// Delivered to the app ids listed.
    Delivered(Vec<String>),
    /// Broadcast data with nobody subscribed to the sensor.
    NoSubscribers,
}

/// Primary sensor host API (Driving Port)
#[async_trait]
pub trait SensorTaskingApi: Send + Sync {
    /// Run one tasking orchestration for a request sent by `source_app_id`.
    ///
    /// `None` is a no-op.
    async fn handle_tasking_request(
        &self,
        source_app_id: &str,
        request: Option<TaskingRequest>,
    ) -> Disposition<TaskingResponse>;

    /// Run one pre-check orchestration for a request sent by `source_app_id`.
    async fn handle_pre_check_request(
        &self,
        source_app_id: &str,
        request: Option<TaskingPreCheckRequest>,
    ) -> Disposition<TaskingPreCheckResponse>;

    /// Hand a downstream tasking reply to whichever orchestration awaits it.
    ///
    /// Returns whether a waiter was found.
    fn deliver_tasking_response(&self, response: TaskingResponse) -> bool;

    /// Hand a downstream pre-check reply to whichever orchestration awaits it.
    fn deliver_pre_check_response(&self, response: TaskingPreCheckResponse) -> bool;

    /// Route sensor data to its explicit destination or to the sensor's subscribers.
    async fn handle_sensor_data(&self, data: SensorData) -> SensorDataRouting;
}
