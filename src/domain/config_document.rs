//! The persisted gateway config document (§3, §6).
//!
//! This is distinct from [`crate::config::ControllerConfig`], which holds
//! the controller's own bootstrap settings (module base path, log level).
//! The document below is runtime state: it is read once at startup, then
//! mutated in place by CnC commands and written back out by the serial
//! writer (§4.6).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry under `cloudConnectors` or `deviceConnectors`: the type name
/// used to look the connector up in the factory, plus its opaque config
/// blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorEntry {
    /// Registry key (or, historically, a module path) identifying the
    /// connector implementation.
    #[serde(rename = "type")]
    pub connector_type: String,

    /// Opaque configuration handed to `Connector::init` verbatim.
    #[serde(default)]
    pub config: Value,
}

/// The full config document: connector type registrations plus the cloud
/// and device connector tables.
///
/// All three fields MUST be mappings — `serde` enforces this structurally
/// since the fields are typed as `HashMap`, not `Vec`; a JSON array in any
/// of these positions fails to deserialize, which [`ConfigDocument::from_json`]
/// turns into a named [`crate::error::ControllerError::ConfigShape`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigDocument {
    /// Connector type name → registry key / module path.
    #[serde(rename = "connectorTypes")]
    pub connector_types: HashMap<String, String>,

    /// Cloud connector id → entry.
    #[serde(rename = "cloudConnectors")]
    pub cloud_connectors: HashMap<String, ConnectorEntry>,

    /// Device connector id → entry.
    #[serde(rename = "deviceConnectors")]
    pub device_connectors: HashMap<String, ConnectorEntry>,
}

impl ConfigDocument {
    /// Parse a config document from raw JSON bytes, distinguishing a bad
    /// shape (wrong section type / missing section) from a bad parse
    /// (not JSON at all).
    ///
    /// # Errors
    ///
    /// Returns `Err((true, ..))` style information via the two-step
    /// contract used by [`crate::controller::Controller::init`]: callers
    /// first try `serde_json::from_slice::<serde_json::Value>`, then hand
    /// the parsed value to [`Self::from_value`] to get shape errors with
    /// the specific missing section named.
    pub fn from_value(value: Value) -> Result<Self, &'static str> {
        let Value::Object(ref map) = value else {
            return Err("connectorTypes");
        };
        for key in ["connectorTypes", "cloudConnectors", "deviceConnectors"] {
            match map.get(key) {
                Some(Value::Object(_)) => {}
                None | Some(_) => return Err(key),
            }
        }
        serde_json::from_value(value).map_err(|_| "connectorTypes")
    }

    /// Mutable access to the section for a category.
    pub fn section_mut(
        &mut self,
        category: crate::domain::Category,
    ) -> &mut HashMap<String, ConnectorEntry> {
        match category {
            crate::domain::Category::Cloud => &mut self.cloud_connectors,
            crate::domain::Category::Device => &mut self.device_connectors,
        }
    }

    /// Read access to the section for a category.
    #[must_use]
    pub fn section(&self, category: crate::domain::Category) -> &HashMap<String, ConnectorEntry> {
        match category {
            crate::domain::Category::Cloud => &self.cloud_connectors,
            crate::domain::Category::Device => &self.device_connectors,
        }
    }

    /// Serialize as canonical pretty-printed JSON (4-space indent), per §4.6
    /// and §6's "pretty-printed with 4-space indentation" writer contract.
    ///
    /// # Errors
    ///
    /// Returns an error only if the document somehow contains
    /// non-serializable data, which cannot happen for this type.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_mapping_sections() {
        let value = json!({
            "connectorTypes": {},
            "cloudConnectors": [],
            "deviceConnectors": {}
        });
        assert_eq!(ConfigDocument::from_value(value), Err("cloudConnectors"));
    }

    #[test]
    fn rejects_missing_section() {
        let value = json!({
            "cloudConnectors": {},
            "deviceConnectors": {}
        });
        assert_eq!(ConfigDocument::from_value(value), Err("connectorTypes"));
    }

    #[test]
    fn accepts_well_shaped_document() {
        let value = json!({
            "connectorTypes": {"A": "./a"},
            "cloudConnectors": {"c1": {"type": "A", "config": {}}},
            "deviceConnectors": {"d1": {"type": "A", "config": {}}}
        });
        let doc = ConfigDocument::from_value(value).unwrap();
        assert_eq!(doc.cloud_connectors.len(), 1);
        assert_eq!(doc.device_connectors.len(), 1);
    }

    #[test]
    fn pretty_json_round_trips() {
        let mut doc = ConfigDocument::default();
        doc.connector_types.insert("A".to_string(), "./a".to_string());
        let text = doc.to_pretty_json().unwrap();
        assert!(text.contains("    "));
        let round_tripped: ConfigDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(round_tripped, doc);
    }
}
