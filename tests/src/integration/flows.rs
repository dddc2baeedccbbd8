//! # Integration Test Flows
//!
//! Client apps, the sensor host, and a mock tasking platform all talk over
//! one `InMemoryMessageBus`.
//!
//! ## Flows Tested:
//!
//! 1. **Client → Host → Platform → Host → Client**: tasking round trip
//! 2. **Timeout / Rejected**: host-synthesized replies
//! 3. **Broadcast**: sensor data reaches apps granted by a successful tasking
//! 4. **Simulated sensor plugin**: plugin-approved taskings and plugin-produced data

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use host_runtime::{HostConfig, HostRuntime, ServiceContainer};
    use hs_sensor_tasking::{PluginPipeline, SensorPlugin, TaskingConfig};
    use shared_bus::{
        HostMessage, InMemoryMessageBus, MessageFilter, MessageTransport, Subscription,
    };
    use shared_types::{
        app_ids, SensorData, StatusCode, TaskingPreCheckRequest, TaskingPreCheckResponse,
        TaskingRequest, TaskingResponse,
    };

    use crate::integration::fixtures::{
        SimulatedSensorPlugin, INTERCEPTED_MESSAGE, SENSOR_ID, SENSOR_TEMPERATURE_ID,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const HOST: &str = app_ids::HOSTSVC_SENSOR;
    const PLATFORM: &str = app_ids::PLATFORM_MTS;

    /// How the mock platform answers.
    #[derive(Clone, Copy)]
    enum PlatformBehavior {
        Reply(StatusCode),
        Silent,
    }

    /// Subscribe the mock platform and answer every request it receives.
    ///
    /// Returns a counter of requests seen.
    fn spawn_mock_platform(
        bus: &Arc<InMemoryMessageBus>,
        behavior: PlatformBehavior,
    ) -> Arc<AtomicUsize> {
        let mut inbox = bus.subscribe(MessageFilter::for_app(PLATFORM));
        let client = bus.client(PLATFORM);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        tokio::spawn(async move {
            while let Some(delivery) = inbox.recv().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let PlatformBehavior::Reply(status) = behavior else {
                    continue;
                };
                let reply: HostMessage = match &delivery.payload {
                    HostMessage::TaskingRequest(request) => TaskingResponse::answering(
                        request,
                        status,
                        format!("platform-{}", request.request_header.tracking_id),
                    )
                    .into(),
                    HostMessage::TaskingPreCheckRequest(request) => {
                        TaskingPreCheckResponse::answering(request, status, "").into()
                    }
                    _ => continue,
                };
                let _ = client.direct_to_app(&delivery.source_app_id, reply).await;
            }
        });

        seen
    }

    async fn start_host(
        bus: &Arc<InMemoryMessageBus>,
        tasking: TaskingConfig,
        plugins: Vec<Arc<dyn SensorPlugin>>,
    ) -> HostRuntime {
        let container = ServiceContainer::with_bus(
            HostConfig::default().with_tasking(tasking),
            PluginPipeline::new(plugins),
            Arc::clone(bus),
        );
        let runtime = HostRuntime::from_container(container);
        runtime.start().await.expect("host start");
        runtime
    }

    fn tasking_request(tracking_id: &str, sensor_id: &str, app_id: &str) -> TaskingRequest {
        let mut request = TaskingRequest::new(app_id, sensor_id);
        request.request_header.tracking_id = tracking_id.to_string();
        request
    }

    async fn next_message(inbox: &mut Subscription) -> HostMessage {
        timeout(Duration::from_secs(2), inbox.recv())
            .await
            .expect("timeout waiting for message")
            .expect("bus closed")
            .payload
    }

    async fn next_tasking_response(inbox: &mut Subscription) -> TaskingResponse {
        loop {
            if let HostMessage::TaskingResponse(response) = next_message(inbox).await {
                return response;
            }
        }
    }

    async fn next_sensor_data(inbox: &mut Subscription) -> SensorData {
        loop {
            if let HostMessage::SensorData(data) = next_message(inbox).await {
                return data;
            }
        }
    }

    // =============================================================================
    // TASKING ROUND TRIPS
    // =============================================================================

    #[tokio::test]
    async fn test_successful_tasking_end_to_end() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let seen = spawn_mock_platform(&bus, PlatformBehavior::Reply(StatusCode::Successful));
        let runtime = start_host(&bus, TaskingConfig::default(), vec![]).await;

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", "S1", "A1").into())
            .await
            .unwrap();

        let response = next_tasking_response(&mut inbox).await;
        assert_eq!(response.response_header.status, StatusCode::Successful);
        assert_eq!(response.response_header.tracking_id, "T1");
        assert_eq!(response.response_header.message, "platform-T1");
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        let container = runtime.container();
        assert!(container.cache.contains_key("T1"));
        assert_eq!(
            container.service.subscriptions().subscribers("S1").await.unwrap(),
            vec!["A1"]
        );
        assert_eq!(container.service.tasking_replies().pending_count(), 0);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_silent_platform_times_out() {
        let bus = Arc::new(InMemoryMessageBus::new());
        spawn_mock_platform(&bus, PlatformBehavior::Silent);
        let tasking = TaskingConfig::default().with_max_response_wait(Duration::from_millis(200));
        let runtime = start_host(&bus, tasking, vec![]).await;

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", "S1", "A1").into())
            .await
            .unwrap();

        let response = next_tasking_response(&mut inbox).await;
        assert_eq!(response.response_header.status, StatusCode::Timeout);

        let container = runtime.container();
        assert!(!container.service.tasking_replies().is_pending("T1"));
        assert!(container
            .service
            .subscriptions()
            .subscribers("S1")
            .await
            .unwrap()
            .is_empty());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_routing_disabled_never_reaches_platform() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let seen = spawn_mock_platform(&bus, PlatformBehavior::Reply(StatusCode::Successful));
        let tasking = TaskingConfig::default().with_downstream_routing(false);
        let runtime = start_host(&bus, tasking, vec![]).await;

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", "S1", "A1").into())
            .await
            .unwrap();

        let response = next_tasking_response(&mut inbox).await;
        assert_eq!(response.response_header.status, StatusCode::Rejected);
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_pre_check_end_to_end() {
        let bus = Arc::new(InMemoryMessageBus::new());
        spawn_mock_platform(&bus, PlatformBehavior::Reply(StatusCode::Successful));
        let runtime = start_host(&bus, TaskingConfig::default(), vec![]).await;

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        let request = TaskingPreCheckRequest::new("A1", "S1");
        let tracking_id = request.request_header.tracking_id.clone();
        bus.client("A1")
            .direct_to_app(HOST, request.into())
            .await
            .unwrap();

        let HostMessage::TaskingPreCheckResponse(response) = next_message(&mut inbox).await else {
            panic!("expected a TaskingPreCheckResponse");
        };
        assert_eq!(response.response_header.status, StatusCode::Successful);
        assert_eq!(response.response_header.tracking_id, tracking_id);

        // Pre-checks never touch subscriptions
        assert!(runtime
            .container()
            .service
            .subscriptions()
            .subscribers("S1")
            .await
            .unwrap()
            .is_empty());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_clients_receive_their_own_replies() {
        let bus = Arc::new(InMemoryMessageBus::new());
        spawn_mock_platform(&bus, PlatformBehavior::Reply(StatusCode::Successful));
        let runtime = start_host(&bus, TaskingConfig::default(), vec![]).await;

        let clients = ["A1", "A2", "A3"];
        let mut inboxes: Vec<_> = clients
            .iter()
            .map(|app| bus.subscribe(MessageFilter::for_app(*app)))
            .collect();

        for (i, app) in clients.iter().enumerate() {
            bus.client(*app)
                .direct_to_app(HOST, tasking_request(&format!("T{i}"), "S1", app).into())
                .await
                .unwrap();
        }

        for (i, inbox) in inboxes.iter_mut().enumerate() {
            let response = next_tasking_response(inbox).await;
            assert_eq!(response.response_header.tracking_id, format!("T{i}"));
            assert_eq!(response.response_header.message, format!("platform-T{i}"));
        }

        assert_eq!(
            runtime
                .container()
                .service
                .subscriptions()
                .subscribers("S1")
                .await
                .unwrap()
                .len(),
            3
        );

        runtime.shutdown().await;
    }

    // =============================================================================
    // BROADCAST
    // =============================================================================

    #[tokio::test]
    async fn test_broadcast_reaches_only_granted_apps() {
        let bus = Arc::new(InMemoryMessageBus::new());
        spawn_mock_platform(&bus, PlatformBehavior::Reply(StatusCode::Successful));
        let runtime = start_host(&bus, TaskingConfig::default(), vec![]).await;

        let mut granted = bus.subscribe(MessageFilter::for_app("A1"));
        let mut bystander = bus.subscribe(MessageFilter::for_app("A2"));

        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", "S1", "A1").into())
            .await
            .unwrap();
        next_tasking_response(&mut granted).await;

        let reading = SensorData {
            sensor_id: "S1".into(),
            data: serde_json::json!({ "value": 42 }),
            ..SensorData::default()
        };
        bus.client("sensor-driver")
            .direct_to_app(HOST, reading.into())
            .await
            .unwrap();

        let data = next_sensor_data(&mut granted).await;
        assert_eq!(data.sensor_id, "S1");
        assert_eq!(data.data["value"], 42);

        assert!(timeout(Duration::from_millis(100), bystander.recv())
            .await
            .is_err());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_tasking_revokes_broadcast() {
        let bus = Arc::new(InMemoryMessageBus::new());
        spawn_mock_platform(&bus, PlatformBehavior::Reply(StatusCode::Rejected));
        let runtime = start_host(&bus, TaskingConfig::default(), vec![]).await;
        let container = runtime.container();
        container.service.subscriptions().grant("S1", "A1").await.unwrap();

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", "S1", "A1").into())
            .await
            .unwrap();

        let response = next_tasking_response(&mut inbox).await;
        assert_eq!(response.response_header.status, StatusCode::Rejected);
        assert!(container
            .service
            .subscriptions()
            .subscribers("S1")
            .await
            .unwrap()
            .is_empty());
        assert!(!container.cache.contains_key("T1"));

        runtime.shutdown().await;
    }

    // =============================================================================
    // SIMULATED SENSOR PLUGIN
    // =============================================================================

    #[tokio::test]
    async fn test_simulated_sensor_tasking_and_direct_data() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let plugin: Arc<dyn SensorPlugin> = Arc::new(SimulatedSensorPlugin::new(
            bus.client(HOST),
            Duration::from_millis(50),
        ));
        // Routing disabled: the plugin turns the local rejection into success
        let tasking = TaskingConfig::default().with_downstream_routing(false);
        let runtime = start_host(&bus, tasking, vec![plugin]).await;

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", SENSOR_ID, "A1").into())
            .await
            .unwrap();

        let response = next_tasking_response(&mut inbox).await;
        assert_eq!(response.response_header.status, StatusCode::Successful);
        assert_eq!(response.response_header.message, INTERCEPTED_MESSAGE);
        assert_eq!(response.sensor_id, SENSOR_ID);

        let data = next_sensor_data(&mut inbox).await;
        assert_eq!(data.sensor_id, SENSOR_ID);
        assert_eq!(data.destination_app_id.as_deref(), Some("A1"));
        assert_eq!(data.data, serde_json::json!("Hello Space World!"));

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_simulated_temperature_broadcast_follows_grants() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let plugin: Arc<dyn SensorPlugin> = Arc::new(SimulatedSensorPlugin::new(
            bus.client(HOST),
            Duration::from_millis(50),
        ));
        let tasking = TaskingConfig::default().with_downstream_routing(false);
        let runtime = start_host(&bus, tasking, vec![plugin]).await;

        let mut inbox = bus.subscribe(MessageFilter::for_app("A1"));
        bus.client("A1")
            .direct_to_app(HOST, tasking_request("T1", SENSOR_TEMPERATURE_ID, "A1").into())
            .await
            .unwrap();
        next_tasking_response(&mut inbox).await;

        // Once granted, unaddressed temperature readings start arriving
        loop {
            let data = next_sensor_data(&mut inbox).await;
            if data.sensor_id == SENSOR_TEMPERATURE_ID {
                assert!(data.destination_app_id.is_none());
                break;
            }
        }

        runtime.shutdown().await;
    }
}
