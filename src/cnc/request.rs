//! The in-flight CnC request (§3, §6): a command paired with the cloud
//! connector it arrived on, plus the completion state the interpreter uses
//! to produce exactly one terminal reply per command.

use serde_json::{Value, json};

use crate::cnc::command::CncCommand;
use crate::connector::DynConnector;
use crate::logging::Level;

/// A command in flight, bound to the cloud connector that delivered it.
///
/// Reply envelopes (log, ack, completion) are all written back through the
/// same connector via its log/outbound buffer (`add_log_data`), per §6 —
/// there is no separate reply channel, the cloud connector that carried the
/// command is also how the gateway talks back to it.
pub struct CncRequest {
    command: CncCommand,
    dispatcher: DynConnector,
}

impl CncRequest {
    /// Pair a parsed command with the cloud connector it was extracted
    /// from.
    #[must_use]
    pub fn new(command: CncCommand, dispatcher: DynConnector) -> Self {
        Self { command, dispatcher }
    }

    /// The parsed command.
    #[must_use]
    pub fn command(&self) -> &CncCommand {
        &self.command
    }

    /// This request's correlation id (already defaulted to `"na"` by
    /// [`CncCommand::from_value`] if the cloud omitted one).
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.command.request_id
    }

    /// Emit a log reply envelope: `{requestId, qos, data: {type: "log",
    /// message: "[<level>] [<requestId>] <message>"}}` (§6).
    ///
    /// Also mirrors the same line to `tracing` with a wall-clock timestamp
    /// field, for local correlation — that timestamp is never part of the
    /// envelope a cloud consumer parses.
    pub fn log(&self, level: Level, message: &str) {
        let formatted = format!("[{}] [{}] {message}", level.tag(), self.request_id());
        tracing::debug!(
            timestamp = %chrono::Utc::now().to_rfc3339(),
            request_id = self.request_id(),
            "{formatted}"
        );
        self.dispatcher.add_log_data(json!({
            "requestId": self.request_id(),
            "qos": level.qos(),
            "data": { "type": "log", "message": formatted },
        }));
    }

    /// Emit an acknowledgement envelope: `{requestId, qos: 1, data: {type:
    /// "ack", action}}` (§6), sent as soon as a command is accepted for
    /// execution.
    pub fn ack(&self) {
        self.dispatcher.add_log_data(json!({
            "requestId": self.request_id(),
            "qos": 1,
            "data": { "type": "ack", "action": self.command.action },
        }));
    }

    /// Emit a successful completion envelope: `{requestId, qos: 1, data:
    /// {type: "complete", hasErrors: false, response}}` (§6). `response`
    /// defaults to an empty object when the handler has nothing to report.
    pub fn complete_ok(&self, response: Value) {
        self.dispatcher.add_log_data(json!({
            "requestId": self.request_id(),
            "qos": 1,
            "data": { "type": "complete", "hasErrors": false, "response": response },
        }));
    }

    /// Emit a failed completion envelope, preceded by an error-level log
    /// record carrying the same message (§6: "accompanied by a log record
    /// at error level").
    pub fn complete_error(&self, message: &str) {
        self.log(Level::Error, message);
        self.dispatcher.add_log_data(json!({
            "requestId": self.request_id(),
            "qos": 1,
            "data": { "type": "complete", "hasErrors": true, "message": message },
        }));
    }
}
