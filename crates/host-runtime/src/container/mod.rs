//! # Service Container
//!
//! Holds the shared infrastructure and the sensor tasking service, built
//! once at startup.

pub mod config;

use std::sync::Arc;

use hs_sensor_tasking::{
    InMemoryCacheStore, PluginPipeline, SensorBusAdapter, TaskingService,
};
use shared_bus::{BusClient, InMemoryMessageBus};
use tracing::info;

pub use config::HostConfig;

/// The tasking service as wired by the host.
pub type HostTaskingService = TaskingService<BusClient, InMemoryCacheStore>;

/// Everything the host runs, wired together.
pub struct ServiceContainer {
    pub config: HostConfig,
    pub bus: Arc<InMemoryMessageBus>,
    pub cache: Arc<InMemoryCacheStore>,
    pub service: Arc<HostTaskingService>,
    pub adapter: Arc<SensorBusAdapter<HostTaskingService>>,
}

impl ServiceContainer {
    /// Build the container on a fresh in-memory bus.
    pub fn new(config: HostConfig, plugins: PluginPipeline) -> Self {
        Self::with_bus(config, plugins, Arc::new(InMemoryMessageBus::new()))
    }

    /// Build the container on an existing bus.
    pub fn with_bus(
        config: HostConfig,
        plugins: PluginPipeline,
        bus: Arc<InMemoryMessageBus>,
    ) -> Self {
        let host_app_id = config.tasking.host_app_id.clone();
        info!(
            app_id = %host_app_id,
            downstream_app = %config.tasking.downstream_app_id,
            plugins = ?plugins.names(),
            "Wiring sensor host service"
        );

        let transport = Arc::new(bus.client(host_app_id.clone()));
        let cache = Arc::new(InMemoryCacheStore::new());
        let service = Arc::new(TaskingService::new(
            config.tasking.clone(),
            transport,
            Arc::clone(&cache),
            plugins,
        ));
        let adapter = Arc::new(SensorBusAdapter::new(
            Arc::clone(&bus),
            Arc::clone(&service),
            host_app_id,
        ));

        Self {
            config,
            bus,
            cache,
            service,
            adapter,
        }
    }
}
