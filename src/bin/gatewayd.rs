//! Thin process entry point: load bootstrap settings, wire up a controller,
//! and run until a shutdown signal arrives.
//!
//! CLI argument parsing, process supervision, and restart orchestration are
//! explicitly out of this crate's scope (§1) — this binary exists only
//! because a crate needs *a* runnable entry point, mirroring the split
//! between the library's `run()`-equivalent and a minimal `main.rs`.

use std::sync::Arc;

use gateway_controller::config::ControllerConfig;
use gateway_controller::connector::factory::NullModuleLoader;
use gateway_controller::{Controller, init_logging, shutdown_signal};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ControllerConfig::load()?;
    init_logging(&config.log);

    info!(version = env!("CARGO_PKG_VERSION"), "starting gateway controller");

    let controller = Controller::new(config, Arc::new(NullModuleLoader), None);
    controller.init().await?;
    info!("controller active");

    shutdown_signal().await;

    if let Err(err) = controller.stop().await {
        error!(error = %err, "controller reported errors during shutdown");
    }
    info!("controller stopped");
    Ok(())
}
