//! # Message Transport
//!
//! Defines the sending side of the bus: the [`MessageTransport`] port every
//! app uses, and the in-memory bus that implements it.

use crate::events::{HostMessage, MessageFilter};
use crate::subscriber::Subscription;
use crate::{Delivery, DEFAULT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use shared_types::Envelope;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from sending on the bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Nobody is listening on the bus.
    #[error("No route to '{destination}'")]
    NoRoute { destination: String },

    /// The transport was shut down.
    #[error("Transport closed")]
    Closed,
}

/// Port for sending a message to another app.
///
/// One transport instance speaks for one app: every message it sends carries
/// that app's id as the envelope source.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// The app id this transport sends as.
    fn app_id(&self) -> &str;

    /// Deliver `message` to `destination`.
    async fn direct_to_app(
        &self,
        destination: &str,
        message: HostMessage,
    ) -> Result<(), TransportError>;
}

/// In-memory implementation of the message bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Subscribers filter by destination app id.
pub struct InMemoryMessageBus {
    /// Broadcast sender for deliveries.
    sender: broadcast::Sender<Delivery>,

    /// Total deliveries published.
    published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryMessageBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to deliveries matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: MessageFilter) -> Subscription {
        debug!(
            topics = ?filter.topics,
            destinations = ?filter.destinations,
            "New subscription created"
        );
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Publish a fully formed delivery.
    ///
    /// Returns the number of subscribers that saw it.
    pub fn publish(&self, delivery: Delivery) -> Result<usize, TransportError> {
        self.published.fetch_add(1, Ordering::Relaxed);

        let message_type = delivery.payload.type_name();
        let source = delivery.source_app_id.clone();
        let destination = delivery.destination_app_id.clone();

        match self.sender.send(delivery) {
            Ok(receivers) => {
                debug!(
                    message_type,
                    source = %source,
                    destination = %destination,
                    receivers,
                    "Message published"
                );
                Ok(receivers)
            }
            Err(_) => {
                warn!(
                    message_type,
                    source = %source,
                    destination = %destination,
                    "Message dropped (no receivers)"
                );
                Err(TransportError::NoRoute { destination })
            }
        }
    }

    /// Create a transport handle that sends as `app_id`.
    #[must_use]
    pub fn client(self: &Arc<Self>, app_id: impl Into<String>) -> BusClient {
        BusClient {
            bus: Arc::clone(self),
            app_id: app_id.into(),
        }
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the total number of deliveries attempted.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`MessageTransport`] bound to one app on an [`InMemoryMessageBus`].
#[derive(Clone)]
pub struct BusClient {
    bus: Arc<InMemoryMessageBus>,
    app_id: String,
}

impl BusClient {
    /// The underlying bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryMessageBus> {
        &self.bus
    }
}

#[async_trait]
impl MessageTransport for BusClient {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    async fn direct_to_app(
        &self,
        destination: &str,
        message: HostMessage,
    ) -> Result<(), TransportError> {
        let delivery = Envelope::new(self.app_id.clone(), destination, message);
        self.bus.publish(delivery).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{SensorData, TaskingRequest};

    #[tokio::test]
    async fn test_send_no_subscribers() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let client = bus.client("app-a");

        let result = client
            .direct_to_app("app-b", SensorData::default().into())
            .await;
        assert_eq!(
            result,
            Err(TransportError::NoRoute {
                destination: "app-b".into()
            })
        );
        assert_eq!(bus.published(), 1);
    }

    #[tokio::test]
    async fn test_send_sets_envelope_source() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let mut sub = bus.subscribe(MessageFilter::for_app("app-b"));
        let client = bus.client("app-a");

        client
            .direct_to_app("app-b", TaskingRequest::new("app-a", "S1").into())
            .await
            .unwrap();

        let delivery = sub.try_recv().unwrap().unwrap();
        assert_eq!(delivery.source_app_id, "app-a");
        assert_eq!(delivery.destination_app_id, "app-b");
        assert!(matches!(delivery.payload, HostMessage::TaskingRequest(_)));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let _sub1 = bus.subscribe(MessageFilter::all());
        let _sub2 = bus.subscribe(MessageFilter::for_app("app-b"));

        let receivers = bus
            .publish(Envelope::new("a", "b", SensorData::default().into()))
            .unwrap();
        assert_eq!(receivers, 2);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_default_bus() {
        let bus = InMemoryMessageBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.published(), 0);
    }
}
