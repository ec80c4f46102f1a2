//! Log type configuration.
//!
//! Each log type may declare a label, the statuses its workflow allows and
//! the status new logs start in. Configuration is read from JSON:
//!
//! ```json
//! {
//!   "log_types": {
//!     "foo": { "label": "Foo", "default_status": "pending", "statuses": ["pending", "done"] },
//!     "bar": { "default_status": "done" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LogError, Result};

/// Log types shipped with a stock installation.
const CORE_LOG_TYPES: &[(&str, &str)] = &[
    ("activity", "Activity"),
    ("birth", "Birth"),
    ("harvest", "Harvest"),
    ("input", "Input"),
    ("lab_test", "Lab test"),
    ("maintenance", "Maintenance"),
    ("medical", "Medical"),
    ("observation", "Observation"),
    ("seeding", "Seeding"),
    ("transplanting", "Transplanting"),
];

/// Statuses of the default log workflow.
pub const DEFAULT_STATUSES: &[&str] = &["pending", "done"];

/// Configuration for one log type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogTypeConfig {
    /// Human readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Status assigned to new logs of this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_status: Option<String>,
    /// Statuses the type's workflow allows. Empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<String>,
}

impl LogTypeConfig {
    /// Creates a type whose new logs start in `status`.
    #[must_use]
    pub fn with_default_status(status: impl Into<String>) -> Self {
        Self {
            default_status: Some(status.into()),
            ..Self::default()
        }
    }
}

/// Configuration for all log types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FarmLogConfig {
    /// Per-type settings, keyed by log type.
    #[serde(default)]
    pub log_types: BTreeMap<String, LogTypeConfig>,
}

impl Default for FarmLogConfig {
    /// Core log types on the default workflow, starting as `pending`.
    fn default() -> Self {
        let log_types = CORE_LOG_TYPES
            .iter()
            .map(|(id, label)| {
                let config = LogTypeConfig {
                    label: Some((*label).to_string()),
                    default_status: Some(DEFAULT_STATUSES[0].to_string()),
                    statuses: DEFAULT_STATUSES.iter().map(|s| (*s).to_string()).collect(),
                };
                ((*id).to_string(), config)
            })
            .collect();
        Self { log_types }
    }
}

impl FarmLogConfig {
    /// Creates a configuration with no log types.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            log_types: BTreeMap::new(),
        }
    }

    /// Adds or replaces a log type.
    #[must_use]
    pub fn with_log_type(mut self, log_type: impl Into<String>, config: LogTypeConfig) -> Self {
        self.log_types.insert(log_type.into(), config);
        self
    }

    /// Parses and validates configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Config`] if the text is malformed or fails
    /// validation.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| LogError::Config(e.to_string()))?;
        config.validate()?;
        debug!(log_types = config.log_types.len(), "parsed log type configuration");
        Ok(config)
    }

    /// Reads and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            log_types = config.log_types.len(),
            "loaded log type configuration"
        );
        Ok(config)
    }

    /// Checks every default status is allowed by its type's workflow.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Config`] naming the first inconsistent type.
    pub fn validate(&self) -> Result<()> {
        for (log_type, config) in &self.log_types {
            if log_type.trim().is_empty() {
                return Err(LogError::Config("log type id must not be empty".to_string()));
            }
            if let Some(default) = &config.default_status {
                if !config.statuses.is_empty() && !config.statuses.contains(default) {
                    return Err(LogError::Config(format!(
                        "default status '{default}' of log type '{log_type}' is not one of {:?}",
                        config.statuses
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns the configuration of a log type.
    #[must_use]
    pub fn log_type(&self, log_type: &str) -> Option<&LogTypeConfig> {
        self.log_types.get(log_type)
    }
}
