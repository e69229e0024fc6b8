//! The CnC command shape (§3): a mapping with a required `action` and a
//! handful of action-specific optional fields.

use serde_json::Value;

/// One command carried by a cloud connector's `data` event.
///
/// All fields besides `action` are optional because which ones are
/// required depends on the action — the interpreter (§4.5) validates
/// per-action requirements itself rather than this type enforcing a union
/// of every action's shape.
#[derive(Debug, Clone)]
pub struct CncCommand {
    /// The action to perform, e.g. `"start_connector"`.
    pub action: String,
    /// Correlation id; `"na"` if the cloud omitted it (§3).
    pub request_id: String,
    /// `cloud` or `device`, for actions scoped to one category.
    pub category: Option<String>,
    /// The connector id a category-scoped action targets.
    pub id: Option<String>,
    /// A connector type name, for `update_config`/`send_data`-style
    /// actions that also carry a type.
    pub r#type: Option<String>,
    /// A module path, for `update_connector_type`.
    pub module_path: Option<String>,
    /// An opaque config blob, for `update_config`.
    pub config: Option<Value>,
    /// An opaque data blob, for `send_data`.
    pub data: Option<Value>,
    /// An opaque payload, for `maintenance_action` — carried under the
    /// wire key `command`, distinct from `data`.
    pub maintenance_command: Option<Value>,
}

/// Request id substituted when a command omits one, per §3.
pub const DEFAULT_REQUEST_ID: &str = "na";

impl CncCommand {
    /// Parse one element of a cloud-emitted command batch.
    ///
    /// # Errors
    ///
    /// Returns a short reason string (for the caller's warning log) if
    /// `value` isn't an object, or is an object without a string
    /// `action` field — both are "drop this element, keep processing the
    /// rest of the batch" conditions per §4.3 and testable property 10.
    pub fn from_value(value: &Value) -> Result<Self, &'static str> {
        let Value::Object(map) = value else {
            return Err("element is not a mapping");
        };
        let Some(Value::String(action)) = map.get("action") else {
            return Err("element is missing a string `action`");
        };

        Ok(Self {
            action: action.clone(),
            request_id: map
                .get("requestId")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_REQUEST_ID)
                .to_string(),
            category: map.get("category").and_then(Value::as_str).map(str::to_string),
            id: map.get("id").and_then(Value::as_str).map(str::to_string),
            r#type: map.get("type").and_then(Value::as_str).map(str::to_string),
            module_path: map
                .get("modulePath")
                .and_then(Value::as_str)
                .map(str::to_string),
            config: map.get("config").cloned(),
            data: map.get("data").cloned(),
            maintenance_command: map.get("command").cloned(),
        })
    }
}
