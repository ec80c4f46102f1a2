//! Long-text field normalization.

use farm_entity::LongText;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::trace;

/// Options passed to a normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerContext {
    /// `Some(true)` for the processed rendering, `Some(false)` for the raw
    /// input, `None` for the full field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_text: Option<bool>,
}

impl NormalizerContext {
    /// Requests processed or raw text explicitly.
    #[must_use]
    pub const fn processed(processed_text: bool) -> Self {
        Self {
            processed_text: Some(processed_text),
        }
    }
}

/// Normalizes long-text fields for CSV output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLongNormalizer;

impl TextLongNormalizer {
    /// Output format handled by this normalizer.
    pub const FORMAT: &'static str = "csv";

    /// Returns true if this normalizer handles `format`.
    #[must_use]
    pub fn supports(&self, format: Option<&str>) -> bool {
        format == Some(Self::FORMAT)
    }

    /// Normalizes a long-text value.
    ///
    /// With `processed_text` set, returns the processed rendering (or the
    /// raw value when none was computed) or the untouched raw value. Without
    /// it, returns the field's `value` and `format` as an object.
    #[must_use]
    pub fn normalize(&self, text: &LongText, context: &NormalizerContext) -> Value {
        match context.processed_text {
            Some(true) => {
                trace!(format = %text.format, "normalizing processed long text");
                Value::String(text.processed.clone().unwrap_or_else(|| text.value.clone()))
            }
            Some(false) => Value::String(text.value.clone()),
            None => json!({
                "value": text.value,
                "format": text.format,
            }),
        }
    }
}
