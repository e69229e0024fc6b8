//! # Gateway Controller
//!
//! The runtime core of an IoT edge gateway: a [`Controller`] that bridges
//! device connectors and cloud connectors, interprets a command-and-control
//! protocol carried over cloud connectors, and persists connector
//! configuration.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                              Controller                               │
//! ├────────────────┬────────────────┬─────────────────┬───────────────────┤
//! │   Connector     │    Factory     │    Pipeline      │   Router / CnC    │
//! │   contract      │  (type name →  │  (per-slot       │  (fanout + the    │
//! │  + base/poll    │   instance)    │   serializer)    │  command          │
//! │                 │                │                  │   interpreter)    │
//! └────────────────┴────────────────┴─────────────────┴───────────────────┘
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod cnc;
pub mod config;
pub mod connector;
pub mod controller;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod router;

pub use controller::Controller;

use tokio::signal;
use tracing::warn;

/// Initialize the global `tracing` subscriber from the loaded log
/// configuration. Respects `RUST_LOG` if set, falling back to the
/// configured level otherwise.
pub fn init_logging(log: &config::LogConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if log.json {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

/// Wait for a graceful-shutdown signal (Ctrl+C or, on unix, SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            warn!("received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            warn!("received SIGTERM, initiating graceful shutdown");
        }
    }
}
