//! Error types for every layer of the controller.
//!
//! Each layer gets its own `thiserror` enum so a caller can match on exactly
//! the failure modes that layer can produce; higher layers wrap lower ones
//! with `#[from]` rather than flattening everything into one type.

use thiserror::Error;

/// Errors a [`crate::connector::Connector`] implementation can surface from
/// its lifecycle and data-ingestion methods.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The concrete connector has not supplied a start/stop hook.
    #[error("connector does not implement this lifecycle step")]
    NotImplemented,

    /// `init` was called with a config payload that isn't a JSON object, or
    /// with a value missing a required key (e.g. `pollFrequency`).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// `addData`/`addLogData` was called with a payload that isn't a JSON
    /// object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Catch-all for subtype-specific failures (I/O, protocol errors, ...).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised by [`crate::connector::factory::ConnectorFactory`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FactoryError {
    /// `typeName` was absent or empty.
    #[error("invalid type")]
    InvalidType,

    /// `id` was absent or empty.
    #[error("invalid id")]
    InvalidId,

    /// `typeName` is not present in the registry.
    #[error("unknown connector type: {0}")]
    UnknownType(String),
}

/// Errors raised by the per-connector action pipeline's guards.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// `init` was requested on a slot that already holds an instance.
    #[error("connector is already active")]
    AlreadyActive,

    /// `stop` (or any step requiring an instance) was requested on a slot
    /// with no instance.
    #[error("connector is not active")]
    NotActive,

    /// `init` was requested while the controller's shutdown flag is set.
    #[error("controller is shutting down")]
    ShuttingDown,

    /// The factory could not construct the connector for this slot.
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// The connector itself failed the lifecycle step.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

/// Errors raised by the CnC command interpreter.
#[derive(Debug, Error)]
pub enum CncError {
    /// A command named a `category` other than `cloud`/`device`.
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// A command's `action` is not one the interpreter recognizes.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The targeted slot, or its config entry, does not exist.
    #[error("no such connector: {category}/{id}")]
    NoSuchConnector {
        /// The category searched.
        category: &'static str,
        /// The id searched.
        id: String,
    },

    /// A required argument was missing from the command.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// An argument was present but shaped wrong for the action (e.g.
    /// `update_config`'s `config` didn't deserialize into a connector
    /// entry).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The targeted lifecycle step failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The factory rejected an `update_connector_type` rebind.
    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Errors raised by [`crate::controller::Controller::init`] and
/// [`crate::controller::Controller::stop`].
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// The config file was not valid JSON.
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// The config document was missing one of the three required mappings,
    /// or one of them was present but not a mapping.
    #[error("config is missing required section: {0}")]
    ConfigShape(&'static str),

    /// One or more connectors failed to start during `init`.
    #[error("one or more connectors failed to start")]
    StartupFailed,

    /// One or more connectors failed to stop during `stop`.
    #[error("one or more connectors failed to stop")]
    ShutdownFailed,
}

/// Result alias for `thiserror` error-heavy call sites.
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;
