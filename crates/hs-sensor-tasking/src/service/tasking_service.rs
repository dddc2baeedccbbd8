//! Sensor Tasking Service
//!
//! Orchestrates one request at a time per call:
//!
//! ```text
//! Received -> PreProcessed -> Routed | Rejected -> AwaitingResponse
//!          -> ResponseReady -> PostProcessed -> Finalized
//! ```
//!
//! A plugin veto at `PreProcessed` or `PostProcessed` ends the exchange in
//! `Dropped` with nothing sent. Concurrent calls share only the correlation
//! registries and the cache.

use async_trait::async_trait;
use host_telemetry::log_tracked_event;
use shared_bus::HostMessage;
use shared_types::{
    SensorData, TaskingPreCheckRequest, TaskingPreCheckResponse, TaskingRequest,
    TaskingResponse, Tracked,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::correlation::CorrelationRegistry;
use crate::domain::{
    Disposition, DownstreamOutcome, Exchange, OrchestrationState, Tasking, TaskingConfig,
    TaskingPreCheck,
};
use crate::plugins::{
    PairedHook, PluginPipeline, PreCheckRequestHook, PreCheckResponseHook, SensorDataHook,
    SingleHook, TaskingRequestHook, TaskingResponseHook,
};
use crate::ports::{
    CacheStore, CacheStoreExt, MessageTransport, SensorDataRouting, SensorTaskingApi,
};
use crate::service::SubscriptionCacheManager;

/// A request/response pair that made it through both pipelines.
struct Completed<Q, R> {
    /// The request as routed downstream, before the response pipeline ran
    routed: Q,
    request: Q,
    response: R,
}

/// Sensor tasking service implementation
///
/// Implements the `SensorTaskingApi` port using injected dependencies.
pub struct TaskingService<T: MessageTransport, C: CacheStore> {
    config: TaskingConfig,
    /// Message transport (driven port)
    transport: Arc<T>,
    /// Outcome cache (driven port)
    cache: Arc<C>,
    plugins: PluginPipeline,
    tasking_replies: CorrelationRegistry<TaskingResponse>,
    pre_check_replies: CorrelationRegistry<TaskingPreCheckResponse>,
    subscriptions: SubscriptionCacheManager<C>,
}

impl<T: MessageTransport, C: CacheStore> TaskingService<T, C> {
    /// Create a new service
    pub fn new(
        config: TaskingConfig,
        transport: Arc<T>,
        cache: Arc<C>,
        plugins: PluginPipeline,
    ) -> Self {
        let subscriptions = SubscriptionCacheManager::new(Arc::clone(&cache), config.clone());
        Self {
            config,
            transport,
            cache,
            plugins,
            tasking_replies: CorrelationRegistry::new(),
            pre_check_replies: CorrelationRegistry::new(),
            subscriptions,
        }
    }

    pub fn config(&self) -> &TaskingConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginPipeline {
        &self.plugins
    }

    pub fn tasking_replies(&self) -> &CorrelationRegistry<TaskingResponse> {
        &self.tasking_replies
    }

    pub fn pre_check_replies(&self) -> &CorrelationRegistry<TaskingPreCheckResponse> {
        &self.pre_check_replies
    }

    pub fn subscriptions(&self) -> &SubscriptionCacheManager<C> {
        &self.subscriptions
    }

    /// Run the shared part of an exchange: pre-pipeline, routing, wait,
    /// post-pipeline.
    ///
    /// `Err` carries the state after which a plugin vetoed the exchange.
    async fn exchange<E, Pre, Post>(
        &self,
        replies: &CorrelationRegistry<E::Response>,
        source_app_id: &str,
        request: E::Request,
        pre: Pre,
        post: Post,
    ) -> Result<Completed<E::Request, E::Response>, OrchestrationState>
    where
        E: Exchange,
        Pre: SingleHook<E::Request>,
        Post: PairedHook<E::Request, E::Response>,
    {
        log_tracked_event!(
            info,
            "Received request",
            request.tracking_id(),
            request.correlation_id(),
            request_type = E::REQUEST_NAME,
            source_app = %source_app_id
        );

        let tracking_id = request.tracking_id().to_string();
        let correlation_id = request.correlation_id().to_string();
        let request = match self.plugins.run1(pre, request).await {
            Some(request) => request,
            None => {
                log_tracked_event!(
                    info,
                    "Request dropped by plugin",
                    tracking_id,
                    correlation_id,
                    request_type = E::REQUEST_NAME,
                    source_app = %source_app_id
                );
                return Err(OrchestrationState::PreProcessed);
            }
        };

        let outcome = self.route::<E>(replies, &request).await;
        let response = outcome.into_response::<E>(&request, &self.config.downstream_app_id);
        log_tracked_event!(
            debug,
            "Response ready",
            request.tracking_id(),
            request.correlation_id(),
            status = %E::status(&response)
        );

        let routed = request.clone();
        match self.plugins.run2(post, request, response).await {
            Some((request, response)) => Ok(Completed {
                routed,
                request,
                response,
            }),
            None => {
                log_tracked_event!(
                    info,
                    "Response dropped by plugin",
                    routed.tracking_id(),
                    routed.correlation_id(),
                    request_type = E::REQUEST_NAME
                );
                Err(OrchestrationState::PostProcessed)
            }
        }
    }

    /// Send `request` downstream and wait for its reply, or decide locally
    /// why not.
    async fn route<E: Exchange>(
        &self,
        replies: &CorrelationRegistry<E::Response>,
        request: &E::Request,
    ) -> DownstreamOutcome<E::Response> {
        let downstream = self.config.downstream_app_id.as_str();

        if !self.config.enable_downstream_routing {
            log_tracked_event!(
                warn,
                "Downstream routing disabled, rejecting",
                request.tracking_id(),
                request.correlation_id(),
                downstream_app = %downstream
            );
            return DownstreamOutcome::Rejected;
        }

        let handle = match replies.subscribe(request.tracking_id()) {
            Ok(handle) => handle,
            Err(e) => {
                log_tracked_event!(
                    warn,
                    "Duplicate in-flight request",
                    request.tracking_id(),
                    request.correlation_id(),
                    error = %e
                );
                return DownstreamOutcome::Duplicate;
            }
        };

        if let Err(e) = self
            .transport
            .direct_to_app(downstream, request.clone().into())
            .await
        {
            replies.cancel(handle);
            log_tracked_event!(
                warn,
                "Failed to route request downstream",
                request.tracking_id(),
                request.correlation_id(),
                downstream_app = %downstream,
                error = %e
            );
            return DownstreamOutcome::Undeliverable(e.to_string());
        }

        log_tracked_event!(
            debug,
            "Routed request, awaiting reply",
            request.tracking_id(),
            request.correlation_id(),
            downstream_app = %downstream,
            wait_ms = self.config.max_response_wait.as_millis() as u64
        );

        match replies
            .await_response(handle, self.config.max_response_wait)
            .await
        {
            Some(response) => DownstreamOutcome::Downstream(response),
            None => DownstreamOutcome::Timeout,
        }
    }

    /// Persist the outcome of a finished tasking.
    ///
    /// `routed` is cached as sent downstream; the final `request` and
    /// `response` decide the subscription change. Failures are logged and
    /// the reply goes out regardless.
    async fn record_tasking_outcome(
        &self,
        source_app_id: &str,
        routed: &TaskingRequest,
        request: &TaskingRequest,
        response: &TaskingResponse,
    ) {
        let status = response.response_header.status;
        let sensor_id = request.sensor_id.as_str();

        if status.is_successful() {
            match self
                .cache
                .put(routed.tracking_id(), routed, self.config.outcome_cache_ttl)
                .await
            {
                Ok(()) => trace!(tracking_id = %routed.tracking_id(), "Cached successful tasking"),
                Err(e) => warn!(
                    tracking_id = %routed.tracking_id(),
                    error = %e,
                    "Failed to cache tasking outcome"
                ),
            }

            info!(
                tracking_id = %request.tracking_id(),
                sensor_id,
                app_id = %source_app_id,
                "Enabling sensor data broadcast"
            );
            if let Err(e) = self.subscriptions.grant(sensor_id, source_app_id).await {
                warn!(sensor_id, app_id = %source_app_id, error = %e, "Failed to grant subscription");
            }
        } else {
            log_tracked_event!(
                warn,
                "Tasking not successful, revoking sensor data broadcast",
                request.tracking_id(),
                request.correlation_id(),
                sensor_id,
                app_id = %source_app_id,
                status = %status
            );
            if let Err(e) = self.subscriptions.revoke(sensor_id, source_app_id).await {
                warn!(sensor_id, app_id = %source_app_id, error = %e, "Failed to revoke subscription");
            }
        }
    }

    /// Send the final reply to the requester.
    async fn reply<R>(&self, destination: &str, response: &R)
    where
        R: Tracked + Clone + Into<HostMessage> + Sync,
    {
        match self
            .transport
            .direct_to_app(destination, response.clone().into())
            .await
        {
            Ok(()) => log_tracked_event!(
                info,
                "Reply sent",
                response.tracking_id(),
                response.correlation_id(),
                destination = %destination
            ),
            Err(e) => log_tracked_event!(
                warn,
                "Failed to send reply",
                response.tracking_id(),
                response.correlation_id(),
                destination = %destination,
                error = %e
            ),
        }
    }
}

#[async_trait]
impl<T, C> SensorTaskingApi for TaskingService<T, C>
where
    T: MessageTransport + 'static,
    C: CacheStore + 'static,
{
    async fn handle_tasking_request(
        &self,
        source_app_id: &str,
        request: Option<TaskingRequest>,
    ) -> Disposition<TaskingResponse> {
        let Some(request) = request else {
            return Disposition::Ignored;
        };

        let completed = match self
            .exchange::<Tasking, _, _>(
                &self.tasking_replies,
                source_app_id,
                request,
                TaskingRequestHook,
                TaskingResponseHook,
            )
            .await
        {
            Ok(completed) => completed,
            Err(after) => return Disposition::Dropped { after },
        };

        self.record_tasking_outcome(
            source_app_id,
            &completed.routed,
            &completed.request,
            &completed.response,
        )
        .await;
        self.reply(source_app_id, &completed.response).await;
        Disposition::Finalized {
            response: completed.response,
        }
    }

    async fn handle_pre_check_request(
        &self,
        source_app_id: &str,
        request: Option<TaskingPreCheckRequest>,
    ) -> Disposition<TaskingPreCheckResponse> {
        let Some(request) = request else {
            return Disposition::Ignored;
        };

        let response = match self
            .exchange::<TaskingPreCheck, _, _>(
                &self.pre_check_replies,
                source_app_id,
                request,
                PreCheckRequestHook,
                PreCheckResponseHook,
            )
            .await
        {
            Ok(completed) => completed.response,
            Err(after) => return Disposition::Dropped { after },
        };

        self.reply(source_app_id, &response).await;
        Disposition::Finalized { response }
    }

    fn deliver_tasking_response(&self, response: TaskingResponse) -> bool {
        self.tasking_replies.deliver(response)
    }

    fn deliver_pre_check_response(&self, response: TaskingPreCheckResponse) -> bool {
        self.pre_check_replies.deliver(response)
    }

    async fn handle_sensor_data(&self, data: SensorData) -> SensorDataRouting {
        let Some(data) = self.plugins.run1(SensorDataHook, data).await else {
            debug!("Sensor data dropped by plugin");
            return SensorDataRouting::Dropped;
        };

        let destinations = match data
            .destination_app_id
            .as_deref()
            .filter(|d| !d.is_empty())
        {
            Some(destination) => vec![destination.to_string()],
            None => match self.subscriptions.subscribers(&data.sensor_id).await {
                Ok(subscribers) => subscribers,
                Err(e) => {
                    warn!(sensor_id = %data.sensor_id, error = %e, "Failed to read subscriptions");
                    Vec::new()
                }
            },
        };

        if destinations.is_empty() {
            info!(
                sensor_id = %data.sensor_id,
                tracking_id = %data.tracking_id(),
                "No subscribers for sensor data, dropping"
            );
            return SensorDataRouting::NoSubscribers;
        }

        let mut delivered = Vec::with_capacity(destinations.len());
        for destination in destinations {
            match self
                .transport
                .direct_to_app(&destination, data.clone().into())
                .await
            {
                Ok(()) => delivered.push(destination),
                Err(e) => warn!(
                    sensor_id = %data.sensor_id,
                    destination = %destination,
                    error = %e,
                    "Failed to deliver sensor data"
                ),
            }
        }
        debug!(sensor_id = %data.sensor_id, delivered = delivered.len(), "Sensor data routed");
        SensorDataRouting::Delivered(delivered)
    }
}
