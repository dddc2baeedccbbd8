//! Plugin Layer
//!
//! Plugins transform, veto, or react to the messages the host handles.
//! Every hook has a pass-through default, so a plugin only overrides what
//! it cares about. Returning `None` from a hook drops the message.

pub mod hooks;
pub mod pipeline;

use async_trait::async_trait;
use shared_types::{
    SensorData, TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest,
    TaskingResponse,
};

pub use hooks::{
    PairedHook, PreCheckRequestHook, PreCheckResponseHook, SensorDataHook, SingleHook,
    TaskingRequestHook, TaskingResponseHook,
};
pub use pipeline::PluginPipeline;

/// Health reported by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginHealth {
    Healthy,
    Unhealthy(String),
}

/// A host plugin.
#[async_trait]
pub trait SensorPlugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn tasking_request(&self, request: TaskingRequest) -> Option<TaskingRequest> {
        Some(request)
    }

    async fn tasking_response(
        &self,
        request: TaskingRequest,
        response: TaskingResponse,
    ) -> (Option<TaskingRequest>, Option<TaskingResponse>) {
        (Some(request), Some(response))
    }

    async fn tasking_pre_check_request(
        &self,
        request: TaskingPreCheckRequest,
    ) -> Option<TaskingPreCheckRequest> {
        Some(request)
    }

    async fn tasking_pre_check_response(
        &self,
        request: TaskingPreCheckRequest,
        response: TaskingPreCheckResponse,
    ) -> (Option<TaskingPreCheckRequest>, Option<TaskingPreCheckResponse>) {
        (Some(request), Some(response))
    }

    async fn sensor_data(&self, data: SensorData) -> Option<SensorData> {
        Some(data)
    }

    /// Long-running work started once when the host starts.
    async fn background_task(&self) {}

    async fn health_check(&self) -> PluginHealth {
        PluginHealth::Healthy
    }
}
