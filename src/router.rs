//! Data/log fanout and cloud command extraction (§4.3).
//!
//! These are pure(ish) functions over a point-in-time snapshot of the
//! currently-active cloud connectors, not over the live registry — see
//! `SPEC_FULL.md` §4.3 for why a snapshot is taken instead of holding a
//! registry-wide lock across the whole fanout.

use serde_json::Value;

use crate::cnc::CncCommand;
use crate::connector::DynConnector;

/// Literal request id used for router-originated deliveries, which aren't
/// responses to any particular CnC request (§3: "`requestId` absent ⇒
/// substituted with literal `"na"`").
const FANOUT_REQUEST_ID: &str = "na";

/// Deliver one device-emitted `data` payload to every active cloud
/// connector in `cloud_connectors`. Best-effort: an individual connector's
/// `add_data` failure is logged and does not stop delivery to the rest
/// (§4.3: "failure of one cloud connector must not starve others").
pub fn route_device_data(payload: &Value, cloud_connectors: &[DynConnector]) {
    for connector in cloud_connectors {
        if let Err(err) = connector.add_data(payload.clone(), FANOUT_REQUEST_ID) {
            tracing::warn!(
                cloud_id = connector.id(),
                error = %err,
                "dropped fanout data delivery to cloud connector"
            );
        }
    }
}

/// Deliver one `log` payload (from either a device or a cloud connector)
/// to every active cloud connector. Same best-effort semantics as
/// [`route_device_data`].
pub fn route_log(payload: &Value, cloud_connectors: &[DynConnector]) {
    for connector in cloud_connectors {
        connector.add_log_data(payload.clone());
    }
}

/// Extract the CnC commands carried by a cloud connector's `data` event.
///
/// Per §4.3 and testable property 9/10: the payload must be a non-empty
/// JSON array, or it is dropped with a warning and yields no commands;
/// each array element must be an object with a string `action`, or that
/// element alone is dropped with a warning while the rest of the batch
/// still executes.
pub fn route_cloud_commands(payload: &Value) -> Vec<CncCommand> {
    let Value::Array(elements) = payload else {
        tracing::warn!("dropped cloud command payload: not a sequence");
        return Vec::new();
    };
    if elements.is_empty() {
        tracing::warn!("dropped cloud command payload: empty sequence");
        return Vec::new();
    }

    elements
        .iter()
        .filter_map(|element| match CncCommand::from_value(element) {
            Ok(command) => Some(command),
            Err(reason) => {
                tracing::warn!(reason, "dropped malformed cloud command element");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_sequence_payload_yields_no_commands() {
        assert!(route_cloud_commands(&json!({"action": "stop_connector"})).is_empty());
    }

    #[test]
    fn empty_sequence_yields_no_commands() {
        assert!(route_cloud_commands(&json!([])).is_empty());
    }

    #[test]
    fn non_mapping_and_missing_action_elements_are_dropped() {
        let payload = json!([
            {"action": "list_connectors"},
            "not a mapping",
            {"requestId": "r1"},
            42
        ]);
        let commands = route_cloud_commands(&payload);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].action, "list_connectors");
    }
}
