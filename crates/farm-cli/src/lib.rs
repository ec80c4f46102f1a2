//! # farm-cli
//!
//! The `farmlog` command-line tool.
//!
//! Provides commands for:
//! - Creating assets and logs (logs get their type's default status)
//! - Querying logs by type, timestamp, status and asset
//! - Listing the logs of an asset and its most recent log
//!
//! Entities live in a JSON store file (`--store`). Log type defaults come
//! from `--config`, or the core log types when no file is given.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod output;

pub use cli::{AssetCommands, Cli, Commands, Format, LogCommands};
pub use context::FarmContext;
pub use error::CliError;
pub use output::OutputFormat;
