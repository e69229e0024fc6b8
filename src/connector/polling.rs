//! The polling connector variant (§4.1): adds a `pollFrequency` config
//! option and a recurring timer that drives a subtype's sampling logic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::connector::{BaseConnector, Connector, LifecycleHooks};
use crate::error::ConnectorError;
use crate::logging::Logger;

/// Extends [`LifecycleHooks`] with the periodic sampling callback the
/// polling variant schedules once `init` succeeds.
#[async_trait]
pub trait Poller: LifecycleHooks {
    /// Invoked every `pollFrequency` milliseconds while the connector is
    /// active. `base` is provided so the implementation can call
    /// [`BaseConnector::emit_data`]/[`BaseConnector::emit_log`] for the
    /// samples it collects.
    async fn process(&self, base: &BaseConnector);
}

/// A connector driven by a recurring timer rather than by inbound I/O.
///
/// `init` rejects [`ConnectorError::InvalidConfig`] if `pollFrequency` is
/// missing or not a positive number. A subsequent `init` reschedules:
/// the prior timer task is aborted before a new one is spawned.
pub struct PollingConnector<H> {
    base: Arc<BaseConnector>,
    hooks: Arc<H>,
    timer: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl<H> PollingConnector<H>
where
    H: Poller + Send + Sync + 'static,
{
    /// Wrap `hooks` in a polling connector with the given id.
    pub fn new(id: impl Into<String>, hooks: H) -> Self {
        Self {
            base: Arc::new(BaseConnector::new(id)),
            hooks: Arc::new(hooks),
            timer: parking_lot::Mutex::new(None),
        }
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
    }

    fn schedule_timer(&self, poll_frequency: Duration) {
        let base = Arc::clone(&self.base);
        let hooks = Arc::clone(&self.hooks);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_frequency);
            interval.tick().await; // first tick fires immediately; skip it
            loop {
                interval.tick().await;
                hooks.process(&base).await;
            }
        });
        *self.timer.lock() = Some(handle);
    }
}

fn extract_poll_frequency(config: &Value) -> Result<Duration, ConnectorError> {
    let millis = config
        .get("pollFrequency")
        .and_then(serde_json::Value::as_f64)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| {
            ConnectorError::InvalidConfig(
                "pollFrequency must be a positive number of milliseconds".to_string(),
            )
        })?;
    Ok(Duration::from_secs_f64(millis / 1000.0))
}

#[async_trait]
impl<H> Connector for PollingConnector<H>
where
    H: Poller + Send + Sync + 'static,
{
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
        if !config.is_object() {
            return Err(ConnectorError::InvalidConfig(
                "config must be a JSON object".to_string(),
            ));
        }
        let poll_frequency = extract_poll_frequency(&config)?;

        // Reschedule: cancel any prior timer before the new init even
        // attempts to start, per §4.1 ("A subsequent init reschedules").
        self.cancel_timer();

        let result = self.base.init(self.hooks.as_ref(), config, request_id).await?;
        self.schedule_timer(poll_frequency);
        Ok(result)
    }

    async fn stop(&self, request_id: &str) -> Result<Value, ConnectorError> {
        self.cancel_timer();
        self.base.stop(self.hooks.as_ref(), request_id).await
    }

    fn add_data(&self, payload: Value, request_id: &str) -> Result<(), ConnectorError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPoller {
        ticks: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LifecycleHooks for CountingPoller {
        async fn on_start(&self, _config: &Value, _request_id: &str) -> Result<Value, ConnectorError> {
            Ok(json!({}))
        }

        async fn on_stop(&self, _request_id: &str) -> Result<Value, ConnectorError> {
            Ok(json!({}))
        }
    }

    #[async_trait]
    impl Poller for CountingPoller {
        async fn process(&self, base: &BaseConnector) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            base.emit_data(json!({"tick": true}));
        }
    }

    #[tokio::test]
    async fn rejects_missing_poll_frequency() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let connector = PollingConnector::new("p1", CountingPoller { ticks });
        let err = connector.init(json!({}), "r1").await.unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn rejects_non_positive_poll_frequency() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let connector = PollingConnector::new("p1", CountingPoller { ticks });
        let err = connector
            .init(json!({"pollFrequency": -5}), "r1")
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidConfig(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn schedules_recurring_process_calls() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let connector = PollingConnector::new("p1", CountingPoller { ticks: Arc::clone(&ticks) });
        connector.init(json!({"pollFrequency": 10}), "r1").await.unwrap();

        tokio::time::advance(Duration::from_millis(35)).await;
        tokio::task::yield_now().await;

        assert!(ticks.load(Ordering::SeqCst) >= 3);

        connector.stop("r1").await.unwrap();
    }
}
