//! Ordered plugin pipeline
//!
//! Plugins run in registration order. Each one receives the previous
//! plugin's output. The first `None` ends the chain and the message is
//! dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{PairedHook, PluginHealth, SensorPlugin, SingleHook};

/// Ordered list of plugins applied to every message.
#[derive(Clone, Default)]
pub struct PluginPipeline {
    plugins: Vec<Arc<dyn SensorPlugin>>,
}

impl PluginPipeline {
    pub fn new(plugins: Vec<Arc<dyn SensorPlugin>>) -> Self {
        Self { plugins }
    }

    /// Append a plugin to the end of the chain.
    pub fn register(&mut self, plugin: Arc<dyn SensorPlugin>) {
        info!(plugin = plugin.name(), position = self.plugins.len(), "Plugin registered");
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Thread `value` through every plugin's `hook`.
    pub async fn run1<T, H>(&self, hook: H, value: T) -> Option<T>
    where
        T: Send + 'static,
        H: SingleHook<T>,
    {
        let mut current = value;
        for plugin in &self.plugins {
            match hook.apply(plugin.as_ref(), current).await {
                Some(next) => current = next,
                None => {
                    debug!(plugin = plugin.name(), "Plugin dropped message");
                    return None;
                }
            }
        }
        Some(current)
    }

    /// Thread a request/response pair through every plugin's `hook`.
    ///
    /// The chain ends as soon as either half comes back `None`.
    pub async fn run2<Q, R, H>(&self, hook: H, request: Q, response: R) -> Option<(Q, R)>
    where
        Q: Send + 'static,
        R: Send + 'static,
        H: PairedHook<Q, R>,
    {
        let mut current = (request, response);
        for plugin in &self.plugins {
            match hook.apply(plugin.as_ref(), current.0, current.1).await {
                (Some(q), Some(r)) => current = (q, r),
                _ => {
                    debug!(plugin = plugin.name(), "Plugin dropped message pair");
                    return None;
                }
            }
        }
        Some(current)
    }

    /// Start every plugin's background task on the runtime.
    pub fn spawn_background_tasks(&self) -> Vec<JoinHandle<()>> {
        self.plugins
            .iter()
            .map(|plugin| {
                let plugin = Arc::clone(plugin);
                tokio::spawn(async move {
                    debug!(plugin = plugin.name(), "Plugin background task started");
                    plugin.background_task().await;
                    debug!(plugin = plugin.name(), "Plugin background task finished");
                })
            })
            .collect()
    }

    /// Ask every plugin for its health.
    pub async fn health_check_all(&self) -> Vec<(String, PluginHealth)> {
        let mut report = Vec::with_capacity(self.plugins.len());
        for plugin in &self.plugins {
            let health = plugin.health_check().await;
            if let PluginHealth::Unhealthy(reason) = &health {
                warn!(plugin = plugin.name(), reason = %reason, "Plugin unhealthy");
            }
            report.push((plugin.name().to_string(), health));
        }
        report
    }
}

impl std::fmt::Debug for PluginPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginPipeline")
            .field("plugins", &self.names())
            .finish()
    }
}
