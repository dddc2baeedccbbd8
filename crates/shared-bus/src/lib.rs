//! # Shared Bus - Message Bus for Host Services
//!
//! Carries `Envelope<HostMessage>` deliveries between apps in the mesh.
//!
//! ## Rules
//!
//! - Apps talk to each other only through a [`MessageTransport`].
//! - Every delivery is addressed to one destination app id.
//! - The envelope's `source_app_id` is the reply address.
//!
//! ```text
//! ┌──────────────┐                      ┌──────────────┐
//! │  Client App  │   direct_to_app()    │ Sensor Host  │
//! │              │ ──────┐              │              │
//! └──────────────┘       │              └──────────────┘
//!                        ▼                      ↑
//!                  ┌──────────────┐            │
//!                  │ Message Bus  │            │
//!                  │              │ ───────────┘
//!                  └──────────────┘  subscribe(destination)
//! ```
//!
//! The in-memory bus here is suitable for single-process operation and
//! tests; a deployment swaps in a transport backed by the real mesh.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{HostMessage, MessageFilter, MessageTopic};
pub use publisher::{BusClient, InMemoryMessageBus, MessageTransport, TransportError};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum deliveries to buffer per subscriber before the slowest lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// A delivery on the bus.
pub type Delivery = shared_types::Envelope<HostMessage>;
