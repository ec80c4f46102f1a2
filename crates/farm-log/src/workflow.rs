//! Default status selection for new logs.
//!
//! Each log type maps to the status its workflow starts in. The mapping is
//! consulted once, when a log is created without an explicit status. Later
//! status changes are never touched, and transition rules are not enforced
//! here.

use std::collections::HashMap;

use farm_entity::Log;
use tracing::trace;

use crate::config::FarmLogConfig;

/// Maps log types to their initial status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusWorkflow {
    defaults: HashMap<String, String>,
}

impl StatusWorkflow {
    /// Creates a workflow from a type → status table.
    #[must_use]
    pub fn new(defaults: HashMap<String, String>) -> Self {
        Self { defaults }
    }

    /// Builds the table from log type configuration.
    ///
    /// Types without a default status are left out.
    #[must_use]
    pub fn from_config(config: &FarmLogConfig) -> Self {
        let defaults = config
            .log_types
            .iter()
            .filter_map(|(log_type, type_config)| {
                type_config
                    .default_status
                    .clone()
                    .map(|status| (log_type.clone(), status))
            })
            .collect();
        Self { defaults }
    }

    /// Returns the initial status for a log type.
    #[must_use]
    pub fn default_status(&self, log_type: &str) -> Option<&str> {
        self.defaults.get(log_type).map(String::as_str)
    }

    /// Fills in the default status when the log has none.
    ///
    /// Returns true if a status was assigned.
    pub fn apply(&self, log: &mut Log) -> bool {
        if log.status.is_some() {
            return false;
        }

        match self.default_status(&log.log_type) {
            Some(status) => {
                trace!(log_type = %log.log_type, status, "applied default log status");
                log.status = Some(status.to_string());
                true
            }
            None => false,
        }
    }
}
