//! Per-connector logging.
//!
//! The source system treats its logger provider as a duck-typed object
//! exposing `getLogger(id)`, with missing level methods polyfilled as
//! no-ops. We model the same contract as a small trait over `tracing`
//! targets: a [`LoggerProvider`] hands out a [`Logger`] scoped to one
//! connector id, and every level is always present because `Logger` owns
//! the polyfill instead of the provider.

use std::sync::Arc;

/// Severity levels a connector (or the controller, on a connector's behalf)
/// may log at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Extremely verbose, rarely enabled tracing.
    Silly,
    /// Developer-facing diagnostic detail.
    Debug,
    /// Slightly quieter than `Debug`; kept distinct for source fidelity.
    Verbose,
    /// Routine operational messages.
    Info,
    /// Recoverable but noteworthy conditions.
    Warn,
    /// Failures.
    Error,
}

impl Level {
    /// QoS level used when this severity is echoed to the cloud as a log
    /// reply envelope (§6): `info` is best-effort (`qos=0`), everything
    /// louder is at-least-once (`qos=1`).
    #[must_use]
    pub const fn qos(self) -> u8 {
        match self {
            Self::Info => 0,
            _ => 1,
        }
    }

    /// Lowercase tag used in the formatted `[<level>] [<requestId>] ...`
    /// log message (§6).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Silly => "silly",
            Self::Debug => "debug",
            Self::Verbose => "verbose",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// A logger scoped to one connector id.
///
/// Cloning is cheap (an `Arc`-wrapped target string plus a provider
/// reference), so a [`Logger`] can be handed to a connector instance and
/// freely cloned into spawned tasks.
#[derive(Clone)]
pub struct Logger {
    target: Arc<str>,
}

impl Logger {
    /// Create a logger that writes through `tracing` using `id` as the
    /// target, so every line a connector emits can be filtered by id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self { target: Arc::from(id) }
    }

    /// A logger that discards everything. Used when no [`LoggerProvider`]
    /// is injected: a missing provider yields a no-op logger rather than a
    /// panic.
    #[must_use]
    pub fn noop() -> Self {
        Self::new("noop")
    }

    /// Emit a message at the given level, scoped to this logger's id.
    pub fn log(&self, level: Level, message: &str) {
        match level {
            Level::Silly | Level::Debug | Level::Verbose => {
                tracing::debug!(target: "connector", id = %self.target, level = level.tag(), "{message}");
            }
            Level::Info => {
                tracing::info!(target: "connector", id = %self.target, "{message}");
            }
            Level::Warn => {
                tracing::warn!(target: "connector", id = %self.target, "{message}");
            }
            Level::Error => {
                tracing::error!(target: "connector", id = %self.target, "{message}");
            }
        }
    }

    /// Convenience wrapper for [`Level::Info`].
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Convenience wrapper for [`Level::Warn`].
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Convenience wrapper for [`Level::Error`].
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Produces per-id [`Logger`]s. Implementations may route to any backend;
/// the controller only ever calls `get_logger`.
pub trait LoggerProvider: Send + Sync {
    /// Obtain (or construct) a logger scoped to `id`.
    fn get_logger(&self, id: &str) -> Logger;
}

/// The default provider used when an embedder doesn't inject one: every id
/// gets a `tracing`-backed logger targeting that id.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLoggerProvider;

impl LoggerProvider for TracingLoggerProvider {
    fn get_logger(&self, id: &str) -> Logger {
        Logger::new(id)
    }
}
