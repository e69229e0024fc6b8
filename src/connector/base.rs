//! The default `init`/`stop` skeleton every concrete connector embeds.
//!
//! Rust has no implementation inheritance, so instead of a base class with
//! overridable lifecycle methods, a concrete connector type holds a
//! [`BaseConnector`] field and implements [`LifecycleHooks`] for its actual
//! start/stop behavior; `BaseConnector::init`/`stop` own the state machine
//! and event plumbing the [`Connector`] contract requires.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::connector::{EventChannels, LifecycleHooks};
use crate::error::ConnectorError;
use crate::logging::Logger;

/// Shared lifecycle state, outbound buffers, and event channels for one
/// connector instance.
pub struct BaseConnector {
    id: String,
    active: AtomicBool,
    logger: Mutex<Logger>,
    outbound: Mutex<VecDeque<Value>>,
    log_outbound: Mutex<VecDeque<Value>>,
    events: EventChannels,
}

impl BaseConnector {
    /// Create a new, `INACTIVE` base for the connector with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active: AtomicBool::new(false),
            logger: Mutex::new(Logger::noop()),
            outbound: Mutex::new(VecDeque::new()),
            log_outbound: Mutex::new(VecDeque::new()),
            events: EventChannels::default(),
        }
    }

    /// This connector's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the connector is currently `ACTIVE`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Replace the attached logger.
    pub fn set_logger(&self, logger: Logger) {
        *self.logger.lock() = logger;
    }

    /// The currently-attached logger.
    #[must_use]
    pub fn logger(&self) -> Logger {
        self.logger.lock().clone()
    }

    /// Run `hooks.on_start`, validating `config` first (§4.1: rejects
    /// `InvalidConfig` when config is not a mapping). Sets state to
    /// `ACTIVE` on success and `INACTIVE` on failure.
    ///
    /// # Errors
    ///
    /// Propagates [`ConnectorError::InvalidConfig`] or whatever the hook
    /// returns.
    pub async fn init(
        &self,
        hooks: &(impl LifecycleHooks + ?Sized),
        config: Value,
        request_id: &str,
    ) -> Result<Value, ConnectorError> {
        if !config.is_object() {
            return Err(ConnectorError::InvalidConfig(
                "config must be a JSON object".to_string(),
            ));
        }
        match hooks.on_start(&config, request_id).await {
            Ok(payload) => {
                self.active.store(true, Ordering::SeqCst);
                Ok(payload)
            }
            Err(err) => {
                self.active.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// Run `hooks.on_stop`, unconditionally setting state to `INACTIVE`
    /// afterward regardless of the outcome (§4.1).
    ///
    /// # Errors
    ///
    /// Propagates whatever `on_stop` returns.
    pub async fn stop(
        &self,
        hooks: &(impl LifecycleHooks + ?Sized),
        request_id: &str,
    ) -> Result<Value, ConnectorError> {
        let result = hooks.on_stop(request_id).await;
        self.active.store(false, Ordering::SeqCst);
        result
    }

    /// Validate and enqueue an outbound payload (§4.1: rejects
    /// `InvalidPayload` when not a mapping). The buffer is unbounded here;
    /// bounding it is left to connectors that need it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidPayload`] if `payload` is not a
    /// JSON object.
    pub fn add_data(&self, payload: Value, _request_id: &str) -> Result<(), ConnectorError> {
        if !payload.is_object() {
            return Err(ConnectorError::InvalidPayload(
                "payload must be a JSON object".to_string(),
            ));
        }
        self.outbound.lock().push_back(payload);
        Ok(())
    }

    /// Enqueue an outbound log payload. Only meaningful for connector
    /// types that override the trait's default no-op `add_log_data` to
    /// call this.
    pub fn add_log_data(&self, payload: Value) {
        self.log_outbound.lock().push_back(payload);
    }

    /// Drain the outbound data buffer, e.g. for a connector's own send
    /// loop to consume.
    pub fn drain_outbound(&self) -> Vec<Value> {
        self.outbound.lock().drain(..).collect()
    }

    /// Drain the outbound log buffer.
    pub fn drain_log_outbound(&self) -> Vec<Value> {
        self.log_outbound.lock().drain(..).collect()
    }

    /// Emit a `data` event, observed by anything subscribed via
    /// [`Self::subscribe_data`] (the router, in production; assertions, in
    /// tests).
    pub fn emit_data(&self, payload: Value) {
        self.events.emit_data(payload);
    }

    /// Emit a `log` event.
    pub fn emit_log(&self, payload: Value) {
        self.events.emit_log(payload);
    }

    /// Subscribe to this connector's `data` events.
    #[must_use]
    pub fn subscribe_data(&self) -> broadcast::Receiver<Value> {
        self.events.subscribe_data()
    }

    /// Subscribe to this connector's `log` events.
    #[must_use]
    pub fn subscribe_log(&self) -> broadcast::Receiver<Value> {
        self.events.subscribe_log()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct AlwaysOk;

    #[async_trait]
    impl LifecycleHooks for AlwaysOk {
        async fn on_start(&self, _config: &Value, _request_id: &str) -> Result<Value, ConnectorError> {
            Ok(json!({"started": true}))
        }

        async fn on_stop(&self, _request_id: &str) -> Result<Value, ConnectorError> {
            Ok(json!({"stopped": true}))
        }
    }

    struct AlwaysErr;

    #[async_trait]
    impl LifecycleHooks for AlwaysErr {
        async fn on_start(&self, _config: &Value, _request_id: &str) -> Result<Value, ConnectorError> {
            Err(ConnectorError::Other(anyhow::anyhow!("boom")))
        }

        async fn on_stop(&self, _request_id: &str) -> Result<Value, ConnectorError> {
            Err(ConnectorError::Other(anyhow::anyhow!("boom")))
        }
    }

    #[tokio::test]
    async fn init_rejects_non_object_config() {
        let base = BaseConnector::new("c1");
        let err = base.init(&AlwaysOk, json!([1, 2, 3]), "r1").await.unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidConfig(_)));
        assert!(!base.is_active());
    }

    #[tokio::test]
    async fn successful_init_activates() {
        let base = BaseConnector::new("c1");
        base.init(&AlwaysOk, json!({}), "r1").await.unwrap();
        assert!(base.is_active());
    }

    #[tokio::test]
    async fn failed_init_leaves_inactive() {
        let base = BaseConnector::new("c1");
        assert!(base.init(&AlwaysErr, json!({}), "r1").await.is_err());
        assert!(!base.is_active());
    }

    #[tokio::test]
    async fn stop_always_deactivates() {
        let base = BaseConnector::new("c1");
        base.init(&AlwaysOk, json!({}), "r1").await.unwrap();
        assert!(base.stop(&AlwaysErr, "r1").await.is_err());
        assert!(!base.is_active());
    }

    #[test]
    fn add_data_rejects_non_object_payload() {
        let base = BaseConnector::new("c1");
        assert!(matches!(
            base.add_data(json!([1]), "r1"),
            Err(ConnectorError::InvalidPayload(_))
        ));
        assert!(base.drain_outbound().is_empty());
    }

    #[test]
    fn add_data_buffers_valid_payloads() {
        let base = BaseConnector::new("c1");
        base.add_data(json!({"value": 42}), "r1").unwrap();
        let drained = base.drain_outbound();
        assert_eq!(drained, vec![json!({"value": 42})]);
    }
}
