//! # Sensor Host Service
//!
//! Entry point for the sensor host: accepts tasking requests from client
//! apps, forwards them to the tasking platform, and routes sensor data to
//! subscribed apps.

use anyhow::{Context, Result};
use host_runtime::{HostConfig, HostRuntime};
use host_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = HostConfig::from_env().context("Invalid host configuration")?;

    let runtime = HostRuntime::new(config, Vec::new());
    runtime.start().await?;

    info!("Sensor host is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    runtime.shutdown().await;
    Ok(())
}
