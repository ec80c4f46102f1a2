//! # farm-log
//!
//! Log queries and asset log tracking for farm records.
//!
//! This crate provides:
//!
//! - [`QueryCriteria`] — Optional type/timestamp/status/asset/limit filters
//! - [`LogQueryFactory`] — Builds sorted log queries from criteria
//! - [`AssetLogs`] — Logs referencing an asset, most recent first
//! - [`StatusWorkflow`] — Initial status per log type
//! - [`LogStorage`] — Log creation with status defaulting
//! - [`FarmLogConfig`] — Log type configuration
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use farm_entity::{Asset, EntityStore, Log, MemoryEntityStore};
//! use farm_log::{AssetLogs, FarmLogConfig, LogQueryFactory, LogStorage, QueryCriteria, StatusWorkflow};
//!
//! let store = Arc::new(MemoryEntityStore::new());
//! let logs = LogStorage::new(store.clone(), StatusWorkflow::from_config(&FarmLogConfig::default()));
//!
//! let asset = store.save_asset(&mut Asset::new("land"))?;
//! let log = logs.create_and_save(Log::builder().log_type("activity").timestamp(100).asset(asset))?;
//! assert_eq!(log.status.as_deref(), Some("pending"));
//!
//! let ids = LogQueryFactory::new(store.clone())
//!     .get_query(&QueryCriteria::new().with_type("activity"))
//!     .access_check(false)
//!     .execute()?;
//! assert_eq!(ids.len(), 1);
//!
//! let first = AssetLogs::new(store).get_first_log(asset)?;
//! assert_eq!(first.and_then(|l| l.id), log.id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod asset_logs;
pub mod config;
pub mod criteria;
pub mod error;
pub mod query;
pub mod storage;
pub mod workflow;

// Re-export main types
pub use asset_logs::AssetLogs;
pub use config::{FarmLogConfig, LogTypeConfig};
pub use criteria::{AssetRef, QueryCriteria};
pub use error::{LogError, Result};
pub use query::{LogQuery, LogQueryFactory, SharedStore};
pub use storage::LogStorage;
pub use workflow::StatusWorkflow;
