//! Document options.

use serde::{Deserialize, Serialize};

use crate::util::Result;

/// Format version written into new documents.
pub const SCHEMA_VERSION: &str = "4.3.1";

/// Options applied when a document is created and exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Written into `metadata.schema_version` of new documents.
    pub schema_version: String,
    /// Start every element type in UUID mode.
    pub use_uuid: bool,
    /// Run the structural validator on every export (messages are logged).
    pub validate_on_export: bool,
    /// Indent exported JSON.
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            use_uuid: false,
            validate_on_export: false,
            pretty: true,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.schema_version, "4.3.1");
        assert!(!s.use_uuid);
        assert!(s.pretty);
    }

    #[test]
    fn test_partial_json() {
        let s = Settings::from_json_str(r#"{"use_uuid": true, "pretty": false}"#).unwrap();
        assert!(s.use_uuid);
        assert!(!s.pretty);
        assert_eq!(s.schema_version, SCHEMA_VERSION);
        assert!(Settings::from_json_str("{").is_err());
    }
}
