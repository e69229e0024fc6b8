//! The connector lifecycle contract (§4.1) every cloud or device connector
//! must implement, plus the [`base`] skeleton concrete connectors embed and
//! the [`polling`] variant for periodically-sampled devices.

pub mod base;
pub mod factory;
pub mod polling;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ConnectorError;
use crate::logging::Logger;

pub use base::BaseConnector;
pub use polling::PollingConnector;

/// Capacity of the broadcast channels backing `data`/`log` events. Generous
/// enough that a slow fanout consumer doesn't lose events under normal
/// operation; a consumer that falls behind by this many events observes a
/// `Lagged` error on its next `recv`, which the router treats as "nothing
/// more to deliver right now" rather than a fatal condition.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A stateful bridge between the gateway and one physical or cloud peer.
///
/// Implementors are driven exclusively through the per-slot
/// [`crate::pipeline::Pipeline`]; nothing outside the owning
/// [`crate::domain::ConnectorRecord`] calls `init`/`stop` directly.
#[async_trait]
pub trait Connector: Send + Sync {
    /// This connector's id, as registered with the factory.
    fn id(&self) -> &str;

    /// Whether the connector is currently `ACTIVE`.
    fn is_active(&self) -> bool;

    /// Attach a per-id logger, as wired by the factory at construction
    /// time (§4.2).
    fn set_logger(&self, logger: Logger);

    /// Validate `config`, run the concrete start hook, and transition to
    /// `ACTIVE` on success.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidConfig`] if `config` is not a JSON
    /// object, or whatever the start hook itself returns.
    async fn init(&self, config: Value, request_id: &str) -> Result<Value, ConnectorError>;

    /// Run the concrete stop hook and transition to `INACTIVE` regardless
    /// of outcome.
    ///
    /// # Errors
    ///
    /// Returns whatever the stop hook returns.
    async fn stop(&self, request_id: &str) -> Result<Value, ConnectorError>;

    /// Enqueue an outbound payload.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidPayload`] if `payload` is not a
    /// JSON object.
    fn add_data(&self, payload: Value, request_id: &str) -> Result<(), ConnectorError>;

    /// Enqueue an outbound log payload. The default is a no-op; cloud
    /// connectors override this to forward log fanout upstream (§4.1).
    fn add_log_data(&self, _payload: Value) {}

    /// Subscribe to this connector's `data` events.
    fn subscribe_data(&self) -> broadcast::Receiver<Value>;

    /// Subscribe to this connector's `log` events.
    fn subscribe_log(&self) -> broadcast::Receiver<Value>;
}

impl std::fmt::Debug for dyn Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector").field("id", &self.id()).finish()
    }
}

/// Shared-ownership handle to a connector instance, as held by a
/// [`crate::domain::ConnectorRecord`] and cloned into router fanout
/// snapshots.
pub type DynConnector = Arc<dyn Connector>;

/// The concrete start/stop behavior a connector type supplies.
///
/// Rust has no implementation inheritance, so instead of a base class with
/// overridable lifecycle methods, concrete connectors hold a
/// [`BaseConnector`] and implement this trait; `BaseConnector::init`/`stop`
/// call into it and own the state transition and event emission that a
/// default `init`/`stop` implementation would otherwise need to repeat.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Called once config has been validated as a JSON object. Returning
    /// `Err` leaves the connector `INACTIVE`.
    async fn on_start(&self, config: &Value, request_id: &str) -> Result<Value, ConnectorError>;

    /// Called on every `stop`, whether or not the connector is currently
    /// active (the pipeline guard already rejects `stop` on an inactive
    /// slot before this is reached, per §4.4, but the hook itself stays
    /// total so tests can call it directly).
    async fn on_stop(&self, request_id: &str) -> Result<Value, ConnectorError>;
}

/// Broadcast-channel pair backing a connector's `data`/`log` events, shared
/// by [`BaseConnector`] and any connector that composes it.
pub(crate) struct EventChannels {
    data_tx: broadcast::Sender<Value>,
    log_tx: broadcast::Sender<Value>,
}

impl Default for EventChannels {
    fn default() -> Self {
        let (data_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (log_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { data_tx, log_tx }
    }
}

impl EventChannels {
    pub(crate) fn emit_data(&self, payload: Value) {
        let _ = self.data_tx.send(payload);
    }

    pub(crate) fn emit_log(&self, payload: Value) {
        let _ = self.log_tx.send(payload);
    }

    pub(crate) fn subscribe_data(&self) -> broadcast::Receiver<Value> {
        self.data_tx.subscribe()
    }

    pub(crate) fn subscribe_log(&self) -> broadcast::Receiver<Value> {
        self.log_tx.subscribe()
    }
}
