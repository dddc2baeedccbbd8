//! # Subscriptions
//!
//! Defines the receiving side of the bus.

use crate::events::MessageFilter;
use crate::Delivery;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Message bus closed")]
    Closed,
}

/// A subscription handle for receiving deliveries.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<Delivery>,

    /// Filter for this subscription.
    filter: MessageFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<Delivery>, filter: MessageFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next delivery that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(delivery)` - The next matching delivery
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<Delivery> {
        loop {
            let delivery = match self.receiver.recv().await {
                Ok(d) => d,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&delivery) {
                return Some(delivery);
            }
        }
    }

    /// Try to receive the next matching delivery without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(delivery))` - A delivery was available and matched
    /// - `Ok(None)` - Nothing available right now
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<Delivery>, SubscriptionError> {
        loop {
            let delivery = match self.receiver.try_recv() {
                Ok(d) => d,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&delivery) {
                return Ok(Some(delivery));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }
}
