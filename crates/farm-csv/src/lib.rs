//! # farm-csv
//!
//! Field normalization for CSV exports.
//!
//! Only the long-text boundary lives here: exports choose between the raw
//! user input and its processed rendering through the `processed_text`
//! context flag. Row layout and quoting belong to the exporter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod normalizer;

pub use normalizer::{NormalizerContext, TextLongNormalizer};
