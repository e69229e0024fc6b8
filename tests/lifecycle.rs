//! End-to-end scenarios for the gateway controller.
//!
//! These tests drive a real `Controller` instance purely through its public
//! surface — the same surface an embedding binary has — using an in-memory
//! `TestConnector` double registered through the public `ModuleLoader`
//! extension point. Commands are delivered the way the real system delivers
//! them: as array-of-object payloads on a cloud connector's own `data`
//! event, not through any crate-internal shortcut.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::broadcast;

use gateway_controller::Controller;
use gateway_controller::config::{ControllerConfig, LogConfig};
use gateway_controller::connector::factory::{ConnectorConstructor, ModuleLoader};
use gateway_controller::connector::{BaseConnector, Connector, DynConnector, LifecycleHooks};
use gateway_controller::error::{ConnectorError, ControllerError};
use gateway_controller::logging::Logger;

// ============================================================================
// Test double
// ============================================================================

#[derive(Default)]
struct Counts {
    init: AtomicUsize,
    stop: AtomicUsize,
    add_data: AtomicUsize,
    last_data: Mutex<Option<Value>>,
}

struct TestConnector {
    base: BaseConnector,
    counts: Arc<Counts>,
    init_delay: Option<Duration>,
}

#[async_trait]
impl LifecycleHooks for TestConnector {
    async fn on_start(&self, _config: &Value, _request_id: &str) -> Result<Value, ConnectorError> {
        self.counts.init.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(json!({}))
    }

    async fn on_stop(&self, _request_id: &str) -> Result<Value, ConnectorError> {
        self.counts.stop.fetch_add(1, Ordering::SeqCst);
        Ok(json!({}))
    }
}

#[async_trait]
impl Connector for TestConnector {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn is_active(&self) -> bool {
        self.base.is_active()
    }

    fn set_logger(&self, logger: Logger) {
        self.base.set_logger(logger);
    }

    async fn init(&self, config: Value, request_id: &str) -> Result<Value, ConnectorError> {
        self.base.init(self, config, request_id).await
    }

    async fn stop(&self, request_id: &str) -> Result<Value, ConnectorError> {
        self.base.stop(self, request_id).await
    }

    fn add_data(&self, payload: Value, request_id: &str) -> Result<(), ConnectorError> {
        self.counts.add_data.fetch_add(1, Ordering::SeqCst);
        *self.counts.last_data.lock() = Some(payload.clone());
        self.base.add_data(payload, request_id)
    }

    fn add_log_data(&self, payload: Value) {
        self.base.add_log_data(payload);
    }

    fn subscribe_data(&self) -> broadcast::Receiver<Value> {
        self.base.subscribe_data()
    }

    fn subscribe_log(&self) -> broadcast::Receiver<Value> {
        self.base.subscribe_log()
    }
}

impl TestConnector {
    fn emit_data(&self, payload: Value) {
        self.base.emit_data(payload);
    }
}

/// Shared bookkeeping the test module loader's constructed connectors write
/// into, keyed by connector id so counts survive a slot being restarted into
/// a fresh instance.
#[derive(Default)]
struct TestState {
    instances: DashMap<String, Arc<TestConnector>>,
    counts: DashMap<String, Arc<Counts>>,
    init_delay: DashMap<String, Duration>,
}

impl TestState {
    fn counts_for(&self, id: &str) -> Arc<Counts> {
        Arc::clone(self.counts.entry(id.to_string()).or_insert_with(|| Arc::new(Counts::default())).value())
    }

    fn set_init_delay(&self, id: &str, delay: Duration) {
        self.init_delay.insert(id.to_string(), delay);
    }

    fn connector(&self, id: &str) -> Arc<TestConnector> {
        Arc::clone(&self.instances.get(id).expect("connector has not been constructed yet"))
    }
}

struct TestModuleLoader {
    state: Arc<TestState>,
}

impl ModuleLoader for TestModuleLoader {
    fn resolve(&self, module_path: &str) -> Option<ConnectorConstructor> {
        if module_path != "./test" {
            return None;
        }
        let state = Arc::clone(&self.state);
        Some(Arc::new(move |id: &str| -> DynConnector {
            let counts = state.counts_for(id);
            let init_delay = state.init_delay.get(id).map(|entry| *entry);
            let connector = Arc::new(TestConnector { base: BaseConnector::new(id), counts, init_delay });
            state.instances.insert(id.to_string(), Arc::clone(&connector));
            connector
        }))
    }
}

// ============================================================================
// Test harness
// ============================================================================

struct TestGateway {
    controller: Controller,
    state: Arc<TestState>,
    _dir: TempDir,
}

impl TestGateway {
    async fn new(config_json: &Value) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("gateway-config.json");
        tokio::fs::write(&path, serde_json::to_vec(config_json).unwrap())
            .await
            .expect("failed to write scratch config file");

        let state = Arc::new(TestState::default());
        let loader: Arc<dyn ModuleLoader> = Arc::new(TestModuleLoader { state: Arc::clone(&state) });
        let config = ControllerConfig {
            module_base_path: String::new(),
            config_file_path: path.to_str().unwrap().to_string(),
            log: LogConfig::default(),
        };

        Self { controller: Controller::new(config, loader, None), state, _dir: dir }
    }
}

fn single_cloud_and_device() -> Value {
    json!({
        "connectorTypes": {"Test": "./test"},
        "cloudConnectors": {"c1": {"type": "Test", "config": {}}},
        "deviceConnectors": {"d1": {"type": "Test", "config": {}}},
    })
}

async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..200 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition was not satisfied within the timeout");
}

// ============================================================================
// S1: happy-path init
// ============================================================================

#[tokio::test]
async fn happy_path_init_activates_every_configured_connector() {
    let gateway = TestGateway::new(&single_cloud_and_device()).await;
    gateway.controller.init().await.expect("init should succeed");

    let cloud = gateway.controller.get_cloud_connectors();
    let device = gateway.controller.get_device_connectors();
    assert!(cloud["c1"].active);
    assert!(device["d1"].active);
}

// ============================================================================
// S2: device -> cloud fanout
// ============================================================================

#[tokio::test]
async fn device_to_cloud_fanout_stops_once_the_cloud_connector_stops() {
    let gateway = TestGateway::new(&single_cloud_and_device()).await;
    gateway.controller.init().await.unwrap();

    let device = gateway.state.connector("d1");
    let cloud = gateway.state.connector("c1");

    device.emit_data(json!({"value": 42}));
    wait_until(|| cloud.counts.add_data.load(Ordering::SeqCst) == 1).await;
    assert_eq!(*cloud.counts.last_data.lock(), Some(json!({"value": 42})));

    cloud.emit_data(json!([
        {"action": "stop_connector", "category": "cloud", "id": "c1", "requestId": "r1"}
    ]));
    wait_until(|| !gateway.controller.get_cloud_connectors()["c1"].active).await;

    device.emit_data(json!({"value": 43}));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(cloud.counts.add_data.load(Ordering::SeqCst), 1);
}

// ============================================================================
// S3: cloud command chaining during a pending init
// ============================================================================

#[tokio::test]
async fn chained_commands_settle_in_pipeline_order_even_while_init_is_pending() {
    let config = json!({
        "connectorTypes": {"Test": "./test"},
        "cloudConnectors": {
            "c1": {"type": "Test", "config": {}},
            "c2": {"type": "Test", "config": {}},
        },
        "deviceConnectors": {},
    });
    let gateway = TestGateway::new(&config).await;
    gateway.state.set_init_delay("c1", Duration::from_millis(80));

    let init_handle = {
        let controller = gateway.controller.clone();
        tokio::spawn(async move { controller.init().await })
    };

    // c2 carries no artificial delay, so it finishes well before c1's first
    // init settles; use it to deliver the race commands targeting c1.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let c2 = gateway.state.connector("c2");
    c2.emit_data(json!([
        {"action": "stop_connector", "category": "cloud", "id": "c1", "requestId": "s1"},
        {"action": "start_connector", "category": "cloud", "id": "c1", "requestId": "s2"},
    ]));

    init_handle.await.expect("init task panicked").expect("init failed");

    let c1_counts = gateway.state.counts_for("c1");
    wait_until(|| c1_counts.init.load(Ordering::SeqCst) == 2 && c1_counts.stop.load(Ordering::SeqCst) == 1).await;
    assert!(gateway.controller.get_cloud_connectors()["c1"].active);
}

// ============================================================================
// S4: maintenance action
// ============================================================================

#[tokio::test]
async fn maintenance_action_stops_every_connector_and_emits_one_event() {
    let gateway = TestGateway::new(&single_cloud_and_device()).await;
    gateway.controller.init().await.unwrap();

    let mut maintenance_rx = gateway.controller.subscribe_maintenance();

    let c1 = gateway.state.connector("c1");
    c1.emit_data(json!([
        {"action": "maintenance_action", "command": "upgrade", "requestId": "r1"}
    ]));

    let event = tokio::time::timeout(Duration::from_secs(2), maintenance_rx.recv())
        .await
        .expect("timed out waiting for the maintenance event")
        .expect("maintenance channel closed unexpectedly");
    assert_eq!(event.command, json!("upgrade"));
    assert_eq!(event.request_id, "r1");

    wait_until(|| {
        !gateway.controller.get_cloud_connectors()["c1"].active
            && !gateway.controller.get_device_connectors()["d1"].active
    })
    .await;

    assert_eq!(gateway.state.counts_for("c1").stop.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.state.counts_for("d1").stop.load(Ordering::SeqCst), 1);
}

// ============================================================================
// S5: config write coalescing
// ============================================================================
//
// The writer's single-flight/coalescing contract itself (exactly one
// in-flight write plus exactly one coalesced follow-up) is pinned at the
// unit level in `src/config/writer.rs`, which can observe the writer's
// internal state directly. This test instead checks the observable,
// black-box consequence through the full command path: the last of several
// rapid `update_config` commands wins.

#[tokio::test]
async fn rapid_config_updates_converge_on_the_latest_value() {
    let gateway = TestGateway::new(&single_cloud_and_device()).await;
    gateway.controller.init().await.unwrap();

    let c1 = gateway.state.connector("c1");
    for revision in 0..3 {
        c1.emit_data(json!([{
            "action": "update_config",
            "category": "device",
            "id": "d1",
            "config": {"type": "Test", "config": {"revision": revision}},
            "requestId": format!("u{revision}"),
        }]));
    }

    wait_until(|| {
        gateway
            .controller
            .get_device_connectors()
            .get("d1")
            .and_then(|snapshot| snapshot.config.clone())
            .is_some_and(|config| config["revision"] == json!(2))
    })
    .await;
}

// ============================================================================
// S6: bad-shape config rejection
// ============================================================================

#[tokio::test]
async fn bad_shaped_config_is_rejected_before_anything_starts() {
    let gateway = TestGateway::new(&json!({
        "cloudConnectors": {},
        "deviceConnectors": {},
    }))
    .await;

    let err = gateway.controller.init().await.unwrap_err();
    assert!(matches!(err, ControllerError::ConfigShape("connectorTypes")));
    assert!(gateway.controller.get_cloud_connectors().is_empty());
    assert!(gateway.controller.get_device_connectors().is_empty());
}
