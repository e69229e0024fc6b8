//! Configuration management.
//!
//! This module covers the controller's own bootstrap settings — module
//! base path, config file location, log level/format — loaded from a
//! `config/default.toml` file overridden by environment variables. It is
//! distinct from the *gateway
//! config document* (`connectorTypes`/`cloudConnectors`/`deviceConnectors`),
//! which is runtime state owned by [`writer::ConfigWriter`] and
//! [`crate::domain::ConfigDocument`], not a bootstrap setting.

mod writer;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use writer::ConfigWriter;

/// The controller's bootstrap settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Base path relative module paths in `connectorTypes` are joined
    /// against (§6). Empty by default, meaning relative paths pass through
    /// unchanged.
    #[serde(default)]
    pub module_base_path: String,

    /// Path to the gateway config document on disk.
    #[serde(default = "default_config_file_path")]
    pub config_file_path: String,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_config_file_path() -> String {
    "gateway-config.json".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            module_base_path: String::new(),
            config_file_path: default_config_file_path(),
            log: LogConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from `config/default.toml` (if present) and
    /// `GATEWAY_CONTROLLER__`-prefixed environment variables, overriding
    /// file values in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if a config source fails to parse or deserialize.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("GATEWAY_CONTROLLER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Logging output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `trace`/`debug`/`info`/`warn`/`error`, or a full `tracing`
    /// `EnvFilter` directive string.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to emit structured JSON log lines instead of the default
    /// human-readable formatter.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}
