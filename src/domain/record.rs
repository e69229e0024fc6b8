//! The per-slot bookkeeping the controller keeps for every connector,
//! whether or not it currently holds a live instance (§3's
//! "ConnectorRecord").

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::connector::DynConnector;
use crate::domain::Category;
use crate::pipeline::Pipeline;

/// The outcome of the most recent lifecycle completion (or failure) on a
/// slot, surfaced to CnC requests and to `getCloudConnectors`/
/// `getDeviceConnectors` snapshots.
#[derive(Debug, Clone, Default)]
pub enum LastResult {
    /// No lifecycle step has completed yet.
    #[default]
    None,
    /// The most recent step resolved successfully with this payload.
    Ok(Value),
    /// The most recent step failed with this formatted message.
    Err(String),
}

/// One slot in the controller's cloud or device connector table.
///
/// Invariants (§3), enforced by [`crate::pipeline::Pipeline`] rather than by
/// this struct itself:
/// - at most one lifecycle step is ever "in flight" on a given record;
/// - if `action_pending` is false and `instance` is `Some`, the instance is
///   `ACTIVE`;
/// - `instance` is cleared whenever a `stop` step settles, regardless of
///   outcome;
/// - `handlers_attached` flips to `true` exactly once per successful
///   `init`, and back to `false` when the instance is cleared.
pub struct ConnectorRecord {
    /// The connector's id, unique within `category`.
    pub id: String,
    /// Which table this slot lives in.
    pub category: Category,
    /// The live instance, if any. Constructed fresh on every successful
    /// `init`; torn down (dropped) on every `stop`, successful or not.
    pub instance: Mutex<Option<DynConnector>>,
    /// True while an `init`/`stop` step is executing on this slot.
    pub action_pending: AtomicBool,
    /// The outcome of the most recent lifecycle completion or error.
    pub last_result: Mutex<LastResult>,
    /// Idempotency guard: event handlers are wired exactly once per
    /// successful `init`.
    pub handlers_attached: AtomicBool,
    /// The data/log subscription tasks spawned for the current instance.
    /// Aborted on `stop` so they can't outlive the instance they were
    /// subscribed to (§3's "on stop it is destroyed").
    pub handler_tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
    /// The serial sequencer for this slot (§4.4).
    pub pipeline: Pipeline,
}

impl ConnectorRecord {
    /// Create an empty slot (no instance yet).
    #[must_use]
    pub fn new(id: String, category: Category) -> Self {
        Self {
            id,
            category,
            instance: Mutex::new(None),
            action_pending: AtomicBool::new(false),
            last_result: Mutex::new(LastResult::None),
            handlers_attached: AtomicBool::new(false),
            handler_tasks: Mutex::new(Vec::new()),
            pipeline: Pipeline::default(),
        }
    }

    /// Whether this slot currently holds a live instance.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.instance.lock().is_some()
    }

    /// A clone of the live instance's `Arc`, if any, for fanout and CnC
    /// dispatch to hold onto without keeping the record's lock.
    #[must_use]
    pub fn instance_handle(&self) -> Option<DynConnector> {
        self.instance.lock().clone()
    }

    /// Snapshot this slot into a [`ConnectorSnapshot`], if it currently
    /// holds an instance. Returns `None` for inactive/absent slots, which
    /// `Controller::getCloudConnectors`/`getDeviceConnectors` skip per
    /// spec ("for records whose instance≠∅").
    pub fn snapshot(
        &self,
        entry: Option<&crate::domain::ConnectorEntry>,
    ) -> Option<ConnectorSnapshot> {
        let instance = self.instance.lock();
        let instance = instance.as_ref()?;
        Some(ConnectorSnapshot {
            id: self.id.clone(),
            active: instance.is_active(),
            action_pending: self.action_pending.load(Ordering::SeqCst),
            last_result: self.last_result.lock().clone(),
            connector_type: entry.map(|e| e.connector_type.clone()),
            config: entry.map(|e| e.config.clone()),
        })
    }
}

/// A point-in-time view of an active connector slot, returned by
/// `Controller::getCloudConnectors`/`getDeviceConnectors`.
#[derive(Debug, Clone)]
pub struct ConnectorSnapshot {
    /// The connector's id.
    pub id: String,
    /// Whether the instance reports itself active.
    pub active: bool,
    /// Whether a lifecycle step is currently in flight.
    pub action_pending: bool,
    /// The most recent lifecycle outcome.
    pub last_result: LastResult,
    /// The connector's type name, if its config entry hasn't been deleted.
    pub connector_type: Option<String>,
    /// The connector's config, if its config entry hasn't been deleted.
    pub config: Option<Value>,
}
