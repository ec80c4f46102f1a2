//! CLI command implementations.
//!
//! - [`asset`] - Asset creation and asset log lookups
//! - [`log`] - Log creation, queries and status changes

pub mod asset;
pub mod log;

pub use asset::AssetCommand;
pub use log::LogCommand;
