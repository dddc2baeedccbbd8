//! # Host Runtime Library
//!
//! Exposes the runtime so integration tests can start a full host in-process.
//! The main entry point is the `main.rs` binary.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize telemetry
//! 3. Build the service container (bus, cache, service, adapter)
//! 4. Start the bus adapter, plugin background tasks, and cache purging
//! 5. Run until ctrl-c, then signal shutdown

pub mod container;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use hs_sensor_tasking::{PluginHealth, PluginPipeline, SensorPlugin};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use container::{HostConfig, HostTaskingService, ServiceContainer};

/// How long each task gets to finish after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The sensor host runtime.
pub struct HostRuntime {
    container: Arc<ServiceContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HostRuntime {
    /// Create a runtime with the given plugins, in registration order.
    pub fn new(config: HostConfig, plugins: Vec<Arc<dyn SensorPlugin>>) -> Self {
        Self::from_container(ServiceContainer::new(config, PluginPipeline::new(plugins)))
    }

    pub fn from_container(container: ServiceContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start listening and run background work.
    pub async fn start(&self) -> Result<()> {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Sensor Host Service v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let adapter = Arc::clone(&self.container.adapter).spawn(self.shutdown_rx.clone());

        let plugins = self.container.service.plugins();
        for (name, health) in plugins.health_check_all().await {
            match health {
                PluginHealth::Healthy => debug!(plugin = %name, "Plugin healthy"),
                PluginHealth::Unhealthy(reason) => {
                    warn!(plugin = %name, reason = %reason, "Plugin reported unhealthy at startup")
                }
            }
        }
        let background = plugins.spawn_background_tasks();

        let purge = self.spawn_cache_purge(config.cache_purge_interval);

        let mut tasks = self.tasks.lock();
        tasks.push(adapter);
        tasks.push(purge);
        tasks.extend(background);

        info!(
            app_id = %config.tasking.host_app_id,
            downstream_app = %config.tasking.downstream_app_id,
            routing_enabled = config.tasking.enable_downstream_routing,
            max_response_wait_ms = config.tasking.max_response_wait.as_millis() as u64,
            "Sensor host service running"
        );
        Ok(())
    }

    fn spawn_cache_purge(&self, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(&self.container.cache);
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!(removed, "Purged expired cache entries");
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    /// Signal every task to stop and abort whatever does not.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            // Plugin background tasks may never return on their own
            let abort = task.abort_handle();
            if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
                abort.abort();
                debug!("Task did not stop in time, aborted");
            }
        }

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<ServiceContainer> {
        Arc::clone(&self.container)
    }
}
