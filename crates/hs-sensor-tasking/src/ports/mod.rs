//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API the bus adapter calls
//! - Driven Ports (outbound) - Cache store and message transport

pub mod inbound;
pub mod outbound;

pub use inbound::{SensorDataRouting, SensorTaskingApi};
pub use outbound::{CacheStore, CacheStoreExt, MessageTransport};
