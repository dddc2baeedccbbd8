//! Adapters Layer
//!
//! - `SensorBusAdapter`: drives the service from the message bus
//! - `InMemoryCacheStore`: cache store with per-entry expiry

pub mod bus_adapter;
pub mod memory_cache;

pub use bus_adapter::SensorBusAdapter;
pub use memory_cache::InMemoryCacheStore;
