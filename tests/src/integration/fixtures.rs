//! # Test Fixtures
//!
//! A simulated sensor plugin. It approves every tasking, remembers who
//! tasked it, and from its background task pushes fake readings back into
//! the host as `SensorData`:
//! - directly addressed data from `DemoHelloWorldSensor` to each client that tasked it
//! - unaddressed broadcast readings from `DemoTemperatureSensor`

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hs_sensor_tasking::{PluginHealth, SensorPlugin};
use parking_lot::Mutex;
use shared_bus::{BusClient, MessageTransport};
use shared_types::{
    RequestHeader, ResponseHeader, SensorData, StatusCode, TaskingPreCheckRequest,
    TaskingPreCheckResponse, TaskingRequest, TaskingResponse,
};
use tracing::{info, warn};

/// Request/reply sensor: data goes straight to the app that tasked it.
pub const SENSOR_ID: &str = "DemoHelloWorldSensor";

/// Broadcast sensor: data carries no destination.
pub const SENSOR_TEMPERATURE_ID: &str = "DemoTemperatureSensor";

pub const INTERCEPTED_MESSAGE: &str = "Response message intercepted by integration test plugin";

pub struct SimulatedSensorPlugin {
    /// Sends as the host app, back to the host app
    transport: BusClient,
    pending_clients: Mutex<Vec<String>>,
    interval: Duration,
    readings: AtomicU64,
}

impl SimulatedSensorPlugin {
    pub fn new(transport: BusClient, interval: Duration) -> Self {
        Self {
            transport,
            pending_clients: Mutex::new(Vec::new()),
            interval,
            readings: AtomicU64::new(0),
        }
    }

    fn hello_world_for(client_id: &str) -> SensorData {
        let header = RequestHeader::new(client_id);
        SensorData {
            response_header: ResponseHeader::answering(&header, StatusCode::Successful, ""),
            sensor_id: SENSOR_ID.to_string(),
            destination_app_id: Some(client_id.to_string()),
            data: serde_json::json!("Hello Space World!"),
            ..SensorData::default()
        }
    }

    fn temperature(reading: u64) -> SensorData {
        let header = RequestHeader::new("");
        SensorData {
            response_header: ResponseHeader::answering(&header, StatusCode::Successful, ""),
            sensor_id: SENSOR_TEMPERATURE_ID.to_string(),
            data: serde_json::json!(format!("Temperature: {}", 10 + reading % 40)),
            ..SensorData::default()
        }
    }

    async fn send_to_host(&self, data: SensorData) {
        let host = self.transport.app_id().to_string();
        if let Err(e) = self.transport.direct_to_app(&host, data.into()).await {
            warn!(error = %e, "Simulated sensor failed to publish");
        }
    }
}

#[async_trait]
impl SensorPlugin for SimulatedSensorPlugin {
    fn name(&self) -> &str {
        "simulated-sensor"
    }

    async fn tasking_response(
        &self,
        request: TaskingRequest,
        mut response: TaskingResponse,
    ) -> (Option<TaskingRequest>, Option<TaskingResponse>) {
        response.response_header.status = StatusCode::Successful;
        response.response_header.message = INTERCEPTED_MESSAGE.to_string();
        response.sensor_id = request.sensor_id.clone();

        let client_id = request.request_header.app_id.clone();
        let mut clients = self.pending_clients.lock();
        if !clients.contains(&client_id) {
            clients.push(client_id);
        }
        drop(clients);

        (Some(request), Some(response))
    }

    async fn tasking_pre_check_response(
        &self,
        request: TaskingPreCheckRequest,
        mut response: TaskingPreCheckResponse,
    ) -> (Option<TaskingPreCheckRequest>, Option<TaskingPreCheckResponse>) {
        response.response_header.status = StatusCode::Successful;
        (Some(request), Some(response))
    }

    async fn background_task(&self) {
        loop {
            let clients: Vec<String> = self.pending_clients.lock().drain(..).collect();
            for client_id in clients {
                info!(sensor = SENSOR_ID, client = %client_id, "Sending simulated sensor data");
                self.send_to_host(Self::hello_world_for(&client_id)).await;
            }

            let reading = self.readings.fetch_add(1, Ordering::Relaxed);
            self.send_to_host(Self::temperature(reading)).await;

            tokio::time::sleep(self.interval).await;
        }
    }

    async fn health_check(&self) -> PluginHealth {
        PluginHealth::Healthy
    }
}
