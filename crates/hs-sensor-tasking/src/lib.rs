//! # HS Sensor Tasking
//!
//! Sensor host service core: takes tasking requests from client apps,
//! forwards them to the downstream tasking platform, correlates the reply,
//! and keeps track of which apps may receive a sensor's broadcast data.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure values, no I/O
//!   - `TaskingConfig`: Configuration with validation and env overrides
//!   - `SubscriptionSet`: Apps authorized for one sensor's broadcasts
//!   - `Exchange`, `DownstreamOutcome`, `Disposition`: orchestration outcomes
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `SensorTaskingApi`: Driving port (inbound API)
//!   - `CacheStore`, `MessageTransport`: Driven ports
//!
//! - **Plugins** (`plugins/`): `SensorPlugin` hooks and the ordered `PluginPipeline`
//!
//! - **Correlation** (`correlation`): one-shot reply registry keyed by tracking id
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `TaskingService`: Implements `SensorTaskingApi`
//!   - `SubscriptionCacheManager`: grant/revoke over the cache
//!
//! - **Adapters Layer** (`adapters/`): External connections
//!   - `SensorBusAdapter`: Message bus subscriber driving the service
//!   - `InMemoryCacheStore`: Cache with per-entry expiry
//!
//! ## Invariants
//!
//! - A reply is delivered to at most one waiter, the one holding its tracking id.
//! - No correlation entry outlives the orchestration that created it.
//! - A subscription set never holds the same app id twice.
//!
//! ## Wiring
//!
//! ```ignore
//! use hs_sensor_tasking::{
//!     InMemoryCacheStore, PluginPipeline, SensorBusAdapter, TaskingConfig, TaskingService,
//! };
//! use shared_bus::InMemoryMessageBus;
//! use std::sync::Arc;
//!
//! let config = TaskingConfig::from_env()?;
//! let bus = Arc::new(InMemoryMessageBus::new());
//! let transport = Arc::new(bus.client(config.host_app_id.clone()));
//! let cache = Arc::new(InMemoryCacheStore::new());
//!
//! let service = Arc::new(TaskingService::new(
//!     config.clone(),
//!     transport,
//!     cache,
//!     PluginPipeline::default(),
//! ));
//! let adapter = Arc::new(SensorBusAdapter::new(bus, service, config.host_app_id));
//! let handle = adapter.spawn(shutdown_rx);
//! ```

pub mod adapters;
pub mod correlation;
pub mod domain;
pub mod error;
pub mod plugins;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryCacheStore, SensorBusAdapter};
pub use correlation::{CorrelationRegistry, CorrelationStats, ResponseHandle};
pub use domain::{
    Disposition, DownstreamOutcome, OrchestrationState, SubscriptionSet, TaskingConfig,
};
pub use error::{CacheError, ConfigError, CorrelationError, TaskingError};
pub use plugins::{PluginHealth, PluginPipeline, SensorPlugin};
pub use ports::{CacheStore, CacheStoreExt, SensorDataRouting, SensorTaskingApi};
pub use service::{SubscriptionCacheManager, TaskingService};
