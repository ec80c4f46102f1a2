//! Core entity types.
//!
//! This module provides:
//! - [`AssetId`] / [`LogId`] — Store-assigned identifiers
//! - [`EntityKind`] — The entity collections a store holds
//! - [`FieldValue`] — Comparable field values used by queries
//! - [`Asset`] — A tracked farm resource
//! - [`Log`] — A timestamped activity record referencing assets
//! - [`LongText`] — Formatted long-text field (raw and processed variants)

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EntityError, Result};

/// Identifier of a saved asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Identifier of a saved log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity collections known to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Tracked resources.
    Asset,
    /// Activity records.
    Log,
}

impl EntityKind {
    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Log => "log",
        }
    }

    /// Field names that may appear in query conditions and sorts.
    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Asset => Asset::FIELDS,
            Self::Log => Log::FIELDS,
        }
    }

    /// Returns true if `field` is queryable on this kind.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comparable field value.
///
/// Entity references are exposed as [`FieldValue::Integer`] holding the
/// target's identifier. Integers are wide enough to hold every `i64`
/// timestamp and every `u64` identifier without loss.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer values: identifiers, timestamps and references.
    Integer(i128),
    /// Text values: bundle tags, statuses, names.
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<AssetId> for FieldValue {
    fn from(value: AssetId) -> Self {
        value.0.into()
    }
}

impl From<LogId> for FieldValue {
    fn from(value: LogId) -> Self {
        value.0.into()
    }
}

/// Read access to an entity's queryable fields.
///
/// Multi-value fields return every value; unset single-value fields return
/// an empty list. `None` means the field does not exist on this entity.
pub trait Entity {
    /// The collection this entity belongs to.
    fn kind(&self) -> EntityKind;

    /// Store-assigned identifier, `None` until first save.
    fn entity_id(&self) -> Option<u64>;

    /// Values of `field`, in delta order.
    fn field_values(&self, field: &str) -> Option<Vec<FieldValue>>;
}

/// Formatted long text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongText {
    /// Raw user input.
    pub value: String,
    /// Text format the value is written in.
    pub format: String,
    /// Rendered variant of `value`, when one has been computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<String>,
}

impl LongText {
    /// Creates long text with no processed variant.
    #[must_use]
    pub fn new(value: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: format.into(),
            processed: None,
        }
    }

    /// Sets the processed variant.
    #[must_use]
    pub fn with_processed(mut self, processed: impl Into<String>) -> Self {
        self.processed = Some(processed.into());
        self
    }
}

/// A tracked farm resource that logs may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Store-assigned identifier.
    pub id: Option<AssetId>,
    /// Universally unique identifier, fixed at creation.
    pub uuid: Uuid,
    /// Bundle tag, e.g. "animal" or "land".
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Human readable name.
    #[serde(default)]
    pub name: String,
    /// Lifecycle status.
    pub status: String,
}

impl Asset {
    /// Queryable asset fields.
    pub const FIELDS: &'static [&'static str] = &["id", "uuid", "type", "name", "status"];

    /// Status assigned to new assets.
    pub const DEFAULT_STATUS: &'static str = "active";

    /// Creates an unsaved asset of the given type.
    #[must_use]
    pub fn new(asset_type: impl Into<String>) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            asset_type: asset_type.into(),
            name: String::new(),
            status: Self::DEFAULT_STATUS.to_string(),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns true once the asset has been saved.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

impl Entity for Asset {
    fn kind(&self) -> EntityKind {
        EntityKind::Asset
    }

    fn entity_id(&self) -> Option<u64> {
        self.id.map(|id| id.0)
    }

    fn field_values(&self, field: &str) -> Option<Vec<FieldValue>> {
        let values = match field {
            "id" => self.id.map(FieldValue::from).into_iter().collect(),
            "uuid" => vec![FieldValue::Text(self.uuid.to_string())],
            "type" => vec![FieldValue::from(self.asset_type.as_str())],
            "name" => vec![FieldValue::from(self.name.as_str())],
            "status" => vec![FieldValue::from(self.status.as_str())],
            _ => return None,
        };
        Some(values)
    }
}

/// A timestamped farm activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Store-assigned identifier.
    pub id: Option<LogId>,
    /// Universally unique identifier, fixed at creation.
    pub uuid: Uuid,
    /// Bundle tag, e.g. "activity" or "harvest".
    #[serde(rename = "type")]
    pub log_type: String,
    /// Human readable name.
    #[serde(default)]
    pub name: String,
    /// When the activity happened, in epoch seconds.
    pub timestamp: i64,
    /// Workflow status; unset when the type has no default.
    #[serde(default)]
    pub status: Option<String>,
    /// Referenced assets, without duplicates, in reference order.
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetId>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<LongText>,
}

impl Log {
    /// Queryable log fields.
    pub const FIELDS: &'static [&'static str] =
        &["id", "uuid", "type", "name", "timestamp", "status", "asset"];

    /// Creates a new log builder.
    #[must_use]
    pub fn builder() -> LogBuilder {
        LogBuilder::default()
    }

    /// Adds an asset reference, ignoring duplicates.
    pub fn add_asset(&mut self, asset: AssetId) {
        if !self.assets.contains(&asset) {
            self.assets.push(asset);
        }
    }

    /// Returns true if this log references the asset.
    #[must_use]
    pub fn references(&self, asset: AssetId) -> bool {
        self.assets.contains(&asset)
    }

    /// Collapses duplicate asset references, keeping the first occurrence.
    pub fn dedup_assets(&mut self) {
        let mut seen = Vec::with_capacity(self.assets.len());
        self.assets.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
    }

    /// Returns true once the log has been saved.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

impl Entity for Log {
    fn kind(&self) -> EntityKind {
        EntityKind::Log
    }

    fn entity_id(&self) -> Option<u64> {
        self.id.map(|id| id.0)
    }

    fn field_values(&self, field: &str) -> Option<Vec<FieldValue>> {
        let values = match field {
            "id" => self.id.map(FieldValue::from).into_iter().collect(),
            "uuid" => vec![FieldValue::Text(self.uuid.to_string())],
            "type" => vec![FieldValue::from(self.log_type.as_str())],
            "name" => vec![FieldValue::from(self.name.as_str())],
            "timestamp" => vec![FieldValue::from(self.timestamp)],
            "status" => self
                .status
                .as_deref()
                .map(FieldValue::from)
                .into_iter()
                .collect(),
            "asset" => self.assets.iter().copied().map(FieldValue::from).collect(),
            _ => return None,
        };
        Some(values)
    }
}

/// Builder for constructing unsaved logs.
#[derive(Debug, Default)]
pub struct LogBuilder {
    log_type: Option<String>,
    name: Option<String>,
    timestamp: Option<i64>,
    status: Option<String>,
    assets: Vec<AssetId>,
    notes: Option<LongText>,
}

impl LogBuilder {
    /// Sets the log type.
    #[must_use]
    pub fn log_type(mut self, log_type: impl Into<String>) -> Self {
        self.log_type = Some(log_type.into());
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the timestamp in epoch seconds.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets an explicit status.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Adds an asset reference.
    #[must_use]
    pub fn asset(mut self, asset: AssetId) -> Self {
        self.assets.push(asset);
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn notes(mut self, notes: LongText) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Builds the log, stamping it with the current time when no timestamp
    /// was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the log type is not set.
    pub fn build(self) -> Result<Log> {
        let now = Utc::now().timestamp();
        self.build_at(now)
    }

    /// Builds the log, using `request_time` when no timestamp was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the log type is not set.
    pub fn build_at(self, request_time: i64) -> Result<Log> {
        let log_type = self.log_type.ok_or(EntityError::MissingField("type"))?;

        let mut log = Log {
            id: None,
            uuid: Uuid::new_v4(),
            log_type,
            name: self.name.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or(request_time),
            status: self.status,
            assets: self.assets,
            notes: self.notes,
        };
        log.dedup_assets();
        Ok(log)
    }
}
