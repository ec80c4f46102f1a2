//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use farm_csv::{NormalizerContext, TextLongNormalizer};
use farm_entity::{Asset, Log};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Asset details.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView {
    /// Asset ID.
    pub id: u64,
    /// Asset type.
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Asset name.
    pub name: String,
    /// Lifecycle status.
    pub status: String,
}

impl From<&Asset> for AssetView {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.map_or(0, |id| id.0),
            asset_type: asset.asset_type.clone(),
            name: asset.name.clone(),
            status: asset.status.clone(),
        }
    }
}

impl TableDisplay for AssetView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Asset {}", self.id)?;
        writeln!(writer, "  Type:    {}", self.asset_type)?;
        writeln!(writer, "  Name:    {}", self.name)?;
        writeln!(writer, "  Status:  {}", self.status)?;
        Ok(())
    }
}

/// Log details with normalized notes.
#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    /// Log ID.
    pub id: u64,
    /// Log type.
    #[serde(rename = "type")]
    pub log_type: String,
    /// Log name.
    pub name: String,
    /// Epoch seconds.
    pub timestamp: i64,
    /// Workflow status.
    pub status: Option<String>,
    /// Referenced asset IDs.
    pub assets: Vec<u64>,
    /// Notes, raw or processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<serde_json::Value>,
}

impl LogView {
    /// Builds a view of `log`, rendering notes with `context`.
    #[must_use]
    pub fn new(log: &Log, context: &NormalizerContext) -> Self {
        Self {
            id: log.id.map_or(0, |id| id.0),
            log_type: log.log_type.clone(),
            name: log.name.clone(),
            timestamp: log.timestamp,
            status: log.status.clone(),
            assets: log.assets.iter().map(|id| id.0).collect(),
            notes: log
                .notes
                .as_ref()
                .map(|notes| TextLongNormalizer.normalize(notes, context)),
        }
    }

    fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("-")
    }
}

impl TableDisplay for LogView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Log {}", self.id)?;
        writeln!(writer, "  Type:       {}", self.log_type)?;
        writeln!(writer, "  Name:       {}", self.name)?;
        writeln!(writer, "  Timestamp:  {}", self.timestamp)?;
        writeln!(writer, "  Status:     {}", self.status_label())?;
        writeln!(writer, "  Assets:     {}", join_ids(&self.assets))?;
        if let Some(notes) = &self.notes {
            match notes {
                serde_json::Value::String(text) => writeln!(writer, "  Notes:      {text}")?,
                other => writeln!(writer, "  Notes:      {other}")?,
            }
        }
        Ok(())
    }
}

/// An ordered list of logs.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct LogList(pub Vec<LogView>);

impl TableDisplay for LogList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.0.is_empty() {
            writeln!(writer, "No logs found.")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<8} {:<16} {:<12} {:<12} {}",
            "ID", "TYPE", "TIMESTAMP", "STATUS", "ASSETS"
        )?;
        for log in &self.0 {
            writeln!(
                writer,
                "{:<8} {:<16} {:<12} {:<12} {}",
                log.id,
                log.log_type,
                log.timestamp,
                log.status_label(),
                join_ids(&log.assets)
            )?;
        }
        Ok(())
    }
}

/// The result of a lookup that may find nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct MaybeLog(pub Option<LogView>);

impl TableDisplay for MaybeLog {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match &self.0 {
            Some(log) => log.write_table(writer),
            None => {
                writeln!(writer, "No logs found.")?;
                Ok(())
            }
        }
    }
}

fn join_ids(ids: &[u64]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
