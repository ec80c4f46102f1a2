//! # farm-entity
//!
//! Asset and log entities for farm record keeping, and the storage
//! abstraction the query services run against.
//!
//! This crate provides:
//!
//! - [`Asset`] / [`Log`] — Entities with store-assigned identifiers
//! - [`EntityQuery`] — Filterable, sortable, limitable query primitive
//! - [`EntityStore`] — Abstract trait for storage backends
//! - [`MemoryEntityStore`] — Thread-safe in-memory backend
//! - [`FileEntityStore`] — JSON snapshot backend
//! - [`AccessPolicy`] — Visibility rule for access-checked queries
//!
//! ## Example
//!
//! ```rust
//! use farm_entity::{
//!     Asset, Direction, EntityKind, EntityQuery, EntityStore, Log, MemoryEntityStore,
//! };
//!
//! let store = MemoryEntityStore::new();
//! let asset = store.save_asset(&mut Asset::new("land"))?;
//!
//! let mut log = Log::builder()
//!     .log_type("activity")
//!     .timestamp(1_700_000_000)
//!     .asset(asset)
//!     .build()?;
//! store.save_log(&mut log)?;
//!
//! let query = EntityQuery::new(EntityKind::Log)
//!     .references("asset", asset.0)
//!     .sort("timestamp", Direction::Desc);
//! assert_eq!(store.execute(&query)?, vec![1]);
//! # Ok::<(), farm_entity::EntityError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod file_store;
pub mod memory;
pub mod query;
pub mod traits;
pub mod types;

// Re-export main types
pub use error::{EntityError, Result};
pub use file_store::FileEntityStore;
pub use memory::{MemoryEntityStore, Snapshot};
pub use query::{Condition, Direction, EntityQuery, Sort};
pub use traits::{AccessPolicy, AllowAll, EntityStore};
pub use types::{
    Asset, AssetId, Entity, EntityKind, FieldValue, Log, LogBuilder, LogId, LongText,
};
