//! Typed hook selectors
//!
//! Each hook names one [`SensorPlugin`] method. The pipeline is generic over
//! the hook, so selecting a stage is static dispatch over a closed set.

use futures::future::BoxFuture;
use shared_types::{
    SensorData, TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest,
    TaskingResponse,
};

use super::SensorPlugin;

/// A hook taking and returning one value.
pub trait SingleHook<T: Send + 'static>: Send + Sync {
    fn apply<'p>(&self, plugin: &'p dyn SensorPlugin, value: T) -> BoxFuture<'p, Option<T>>;
}

/// A hook taking and returning a request/response pair.
pub trait PairedHook<Q: Send + 'static, R: Send + 'static>: Send + Sync {
    fn apply<'p>(
        &self,
        plugin: &'p dyn SensorPlugin,
        request: Q,
        response: R,
    ) -> BoxFuture<'p, (Option<Q>, Option<R>)>;
}

/// [`SensorPlugin::tasking_request`]
#[derive(Debug, Clone, Copy)]
pub struct TaskingRequestHook;

impl SingleHook<TaskingRequest> for TaskingRequestHook {
    fn apply<'p>(
        &self,
        plugin: &'p dyn SensorPlugin,
        value: TaskingRequest,
    ) -> BoxFuture<'p, Option<TaskingRequest>> {
        plugin.tasking_request(value)
    }
}

/// [`SensorPlugin::tasking_response`]
#[derive(Debug, Clone, Copy)]
pub struct TaskingResponseHook;

impl PairedHook<TaskingRequest, TaskingResponse> for TaskingResponseHook {
    fn apply<'p>(
        &self,
        plugin: &'p dyn SensorPlugin,
        request: TaskingRequest,
        response: TaskingResponse,
    ) -> BoxFuture<'p, (Option<TaskingRequest>, Option<TaskingResponse>)> {
        plugin.tasking_response(request, response)
    }
}

/// [`SensorPlugin::tasking_pre_check_request`]
#[derive(Debug, Clone, Copy)]
pub struct PreCheckRequestHook;

impl SingleHook<TaskingPreCheckRequest> for PreCheckRequestHook {
    fn apply<'p>(
        &self,
        plugin: &'p dyn SensorPlugin,
        value: TaskingPreCheckRequest,
    ) -> BoxFuture<'p, Option<TaskingPreCheckRequest>> {
        plugin.tasking_pre_check_request(value)
    }
}

/// [`SensorPlugin::tasking_pre_check_response`]
#[derive(Debug, Clone, Copy)]
pub struct PreCheckResponseHook;

impl PairedHook<TaskingPreCheckRequest, TaskingPreCheckResponse> for PreCheckResponseHook {
    fn apply<'p>(
        &self,
        plugin: &'p dyn SensorPlugin,
        request: TaskingPreCheckRequest,
        response: TaskingPreCheckResponse,
    ) -> BoxFuture<'p, (Option<TaskingPreCheckRequest>, Option<TaskingPreCheckResponse>)> {
        plugin.tasking_pre_check_response(request, response)
    }
}

/// [`SensorPlugin::sensor_data`]
#[derive(Debug, Clone, Copy)]
pub struct SensorDataHook;

impl SingleHook<SensorData> for SensorDataHook {
    fn apply<'p>(&self, plugin: &'p dyn SensorPlugin, value: SensorData) -> BoxFuture<'p, Option<SensorData>> {
        plugin.sensor_data(value)
    }
}
