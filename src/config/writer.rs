//! The single-flight, coalescing config document writer (§4.6, Module F).
//!
//! At most one write is ever in flight. A mutation that arrives while a
//! write is running doesn't spawn a second writer task; it replaces
//! `pending` with the newer snapshot, and the in-flight task picks it up as
//! its own follow-up the moment it finishes. This gives "exactly one
//! coalesced follow-up regardless of how many mutations land while a write
//! is running" by construction, since `pending` is a single slot, not a
//! queue.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::ConfigDocument;

struct WriterState {
    in_flight: bool,
    pending: Option<ConfigDocument>,
}

/// Writes the gateway config document to disk, coalescing concurrent
/// mutation requests into a single in-flight write plus at most one
/// queued follow-up.
pub struct ConfigWriter {
    path: String,
    state: Mutex<WriterState>,
}

impl ConfigWriter {
    /// Create a writer targeting `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            state: Mutex::new(WriterState { in_flight: false, pending: None }),
        })
    }

    /// Request that `doc` be persisted.
    ///
    /// If nothing is currently being written, spawns the write
    /// immediately. If a write is already in flight, `doc` replaces
    /// whatever was previously pending and this call returns without
    /// spawning anything — the in-flight task picks up the latest pending
    /// snapshot when it finishes.
    pub fn request_write(self: &Arc<Self>, doc: ConfigDocument) {
        let mut state = self.state.lock();
        if state.in_flight {
            state.pending = Some(doc);
            return;
        }
        state.in_flight = true;
        drop(state);

        let writer = Arc::clone(self);
        tokio::spawn(async move {
            writer.run_write_loop(doc).await;
        });
    }

    async fn run_write_loop(self: Arc<Self>, mut doc: ConfigDocument) {
        loop {
            self.write_once(&doc).await;

            let mut state = self.state.lock();
            match state.pending.take() {
                Some(next) => {
                    drop(state);
                    doc = next;
                }
                None => {
                    state.in_flight = false;
                    return;
                }
            }
        }
    }

    async fn write_once(&self, doc: &ConfigDocument) {
        let text = match doc.to_pretty_json() {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize config document, dropping this write");
                return;
            }
        };

        let tmp_path = format!("{}.tmp-{}", self.path, uuid::Uuid::new_v4());
        if let Err(err) = tokio::fs::write(&tmp_path, &text).await {
            tracing::error!(error = %err, path = %self.path, "failed to write temporary config file");
            return;
        }

        if let Err(err) = tokio::fs::rename(&tmp_path, &self.path).await {
            tracing::warn!(
                error = %err,
                path = %self.path,
                "atomic rename of config file failed, falling back to a direct write"
            );
            if let Err(err) = tokio::fs::write(&self.path, &text).await {
                tracing::error!(error = %err, path = %self.path, "fallback config write also failed");
            }
            let _ = tokio::fs::remove_file(&tmp_path).await;
        }
    }
}
