//! Domain types shared across the controller: the connector category
//! enumeration, the on-disk config document shape, and the per-slot
//! bookkeeping record the controller keeps for every connector instance.

mod config_document;
mod record;

pub use config_document::{ConfigDocument, ConnectorEntry};
pub use record::{ConnectorRecord, ConnectorSnapshot, LastResult};

use serde::{Deserialize, Serialize};

/// Which side of the gateway a connector bridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A connector whose peer is an upstream control/telemetry service.
    Cloud,
    /// A connector whose peer is a local sensor, actuator, or bus.
    Device,
}

impl Category {
    /// Parse a category from the string form used in CnC commands.
    ///
    /// # Errors
    ///
    /// Returns the original string if it is neither `"cloud"` nor
    /// `"device"`, so the caller can report `InvalidCategory` with the
    /// offending value.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "cloud" => Ok(Self::Cloud),
            "device" => Ok(Self::Device),
            other => Err(other.to_string()),
        }
    }

    /// Both categories, in a stable order — used whenever a command omits
    /// `category` and the effect applies to "both categories".
    #[must_use]
    pub const fn both() -> [Self; 2] {
        [Self::Cloud, Self::Device]
    }

    /// The lowercase string form, as a `'static` string rather than an
    /// allocation — used in error messages that need `category` without
    /// owning a `String`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Device => "device",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cloud => write!(f, "cloud"),
            Self::Device => write!(f, "device"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_categories() {
        assert_eq!(Category::parse("cloud"), Ok(Category::Cloud));
        assert_eq!(Category::parse("device"), Ok(Category::Device));
    }

    #[test]
    fn parse_rejects_unknown_categories() {
        assert_eq!(Category::parse("satellite"), Err("satellite".to_string()));
    }
}
