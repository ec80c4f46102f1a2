//! Log query criteria.
//!
//! [`QueryCriteria`] is the mapping of optional filters accepted by the log
//! query factory. All provided keys are combined with logical AND. Unknown
//! keys are rejected rather than silently ignored.

use farm_entity::{Asset, AssetId};
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Anything that identifies an asset.
///
/// Unsaved assets have no identity and are referenced by no log.
pub trait AssetRef {
    /// Returns the asset's identifier, if it has one.
    fn asset_id(&self) -> Option<AssetId>;
}

impl AssetRef for AssetId {
    fn asset_id(&self) -> Option<AssetId> {
        Some(*self)
    }
}

impl AssetRef for Asset {
    fn asset_id(&self) -> Option<AssetId> {
        self.id
    }
}

impl<T: AssetRef + ?Sized> AssetRef for &T {
    fn asset_id(&self) -> Option<AssetId> {
        (**self).asset_id()
    }
}

/// Optional, conjunctive filters for log queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryCriteria {
    /// Only logs of this type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub log_type: Option<String>,
    /// Only logs at or before this epoch-seconds timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Only logs with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Only logs referencing this asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetId>,
    /// At most this many results, most recent first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryCriteria {
    /// Creates empty criteria that match every log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses criteria from a JSON mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidCriteria`] for unknown keys or values of
    /// the wrong shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| LogError::InvalidCriteria(e.to_string()))
    }

    /// Parses criteria from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidCriteria`] if the text is not a valid
    /// criteria mapping.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| LogError::InvalidCriteria(e.to_string()))
    }

    /// Filters by log type.
    #[must_use]
    pub fn with_type(mut self, log_type: impl Into<String>) -> Self {
        self.log_type = Some(log_type.into());
        self
    }

    /// Excludes logs after `timestamp`.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Filters by status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Filters by asset reference.
    #[must_use]
    pub const fn with_asset(mut self, asset: AssetId) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Limits the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if no filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.log_type.is_none()
            && self.timestamp.is_none()
            && self.status.is_none()
            && self.asset.is_none()
            && self.limit.is_none()
    }
}
