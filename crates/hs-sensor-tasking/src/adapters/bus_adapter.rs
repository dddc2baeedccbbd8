//! Message bus adapter for the sensor host
//!
//! Listens for every delivery addressed to the host app and dispatches it
//! to the [`SensorTaskingApi`]:
//! - `TaskingRequest` / `TaskingPreCheckRequest`: one spawned orchestration each
//! - `TaskingResponse` / `TaskingPreCheckResponse`: handed to the waiting orchestration
//! - `SensorData`: spawned broadcast routing

use std::sync::Arc;

use shared_bus::{Delivery, HostMessage, InMemoryMessageBus, MessageFilter, Subscription};
use shared_types::validate_envelope;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::SensorTaskingApi;

/// Bus adapter for the sensor tasking subsystem
pub struct SensorBusAdapter<S: SensorTaskingApi + 'static> {
    bus: Arc<InMemoryMessageBus>,
    service: Arc<S>,
    host_app_id: String,
}

impl<S: SensorTaskingApi + 'static> SensorBusAdapter<S> {
    pub fn new(bus: Arc<InMemoryMessageBus>, service: Arc<S>, host_app_id: impl Into<String>) -> Self {
        Self {
            bus,
            service,
            host_app_id: host_app_id.into(),
        }
    }

    pub fn host_app_id(&self) -> &str {
        &self.host_app_id
    }

    /// Subscribe to the bus and start the dispatch loop.
    ///
    /// The subscription exists when this returns, so nothing sent after the
    /// call is missed. The loop ends when `shutdown` flips to `true` or the
    /// bus goes away.
    pub fn spawn(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let subscription = self.bus.subscribe(MessageFilter::for_app(self.host_app_id.clone()));
        tokio::spawn(self.run(subscription, shutdown))
    }

    async fn run(self: Arc<Self>, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!(app_id = %self.host_app_id, "[SensorBusAdapter] Started listening for messages");

        loop {
            tokio::select! {
                delivery = subscription.recv() => match delivery {
                    Some(delivery) => self.dispatch(delivery),
                    None => {
                        warn!("[SensorBusAdapter] Message bus closed, shutting down");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[SensorBusAdapter] Shutdown requested");
                        break;
                    }
                }
            }
        }
    }

    /// Route one delivery to the service.
    pub fn dispatch(&self, delivery: Delivery) {
        if let Err(e) = validate_envelope(&delivery) {
            warn!(
                message_id = %delivery.message_id,
                error = %e,
                "Discarding invalid envelope"
            );
            return;
        }

        let source = delivery.source_app_id;
        debug!(
            message_type = delivery.payload.type_name(),
            tracking_id = %delivery.payload.tracking_id(),
            source_app = %source,
            "Dispatching message"
        );

        match delivery.payload {
            HostMessage::TaskingRequest(request) => {
                let service = Arc::clone(&self.service);
                tokio::spawn(async move {
                    service.handle_tasking_request(&source, Some(request)).await;
                });
            }
            HostMessage::TaskingPreCheckRequest(request) => {
                let service = Arc::clone(&self.service);
                tokio::spawn(async move {
                    service.handle_pre_check_request(&source, Some(request)).await;
                });
            }
            HostMessage::TaskingResponse(response) => {
                self.service.deliver_tasking_response(response);
            }
            HostMessage::TaskingPreCheckResponse(response) => {
                self.service.deliver_pre_check_response(response);
            }
            HostMessage::SensorData(data) => {
                let service = Arc::clone(&self.service);
                tokio::spawn(async move {
                    service.handle_sensor_data(data).await;
                });
            }
        }
    }
}
