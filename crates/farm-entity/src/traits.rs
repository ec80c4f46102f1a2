//! Traits for entity storage backends.
//!
//! This module provides the [`EntityStore`] trait for abstracting over
//! different storage implementations (in-memory, file-backed, etc.) and the
//! [`AccessPolicy`] trait consulted by access-checked queries.

use crate::error::Result;
use crate::query::EntityQuery;
use crate::types::{Asset, AssetId, Entity, Log, LogId};

/// Trait for entity storage backends.
///
/// Implementors persist assets and logs and execute [`EntityQuery`]s over
/// them. Query services hold a store reference and never touch the storage
/// engine directly.
pub trait EntityStore: Send + Sync {
    /// Saves an asset, assigning an ID on first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset cannot be persisted.
    fn save_asset(&self, asset: &mut Asset) -> Result<AssetId>;

    /// Loads an asset by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to read.
    fn load_asset(&self, id: AssetId) -> Result<Option<Asset>>;

    /// Saves a log, assigning an ID on first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be persisted.
    fn save_log(&self, log: &mut Log) -> Result<LogId>;

    /// Loads a log by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to read.
    fn load_log(&self, id: LogId) -> Result<Option<Log>>;

    /// Loads several logs, preserving the requested order.
    ///
    /// IDs with no stored log are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to read.
    fn load_logs(&self, ids: &[LogId]) -> Result<Vec<Log>> {
        let mut logs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(log) = self.load_log(*id)? {
                logs.push(log);
            }
        }
        Ok(logs)
    }

    /// Deletes a log, returning true if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion cannot be persisted.
    fn delete_log(&self, id: LogId) -> Result<bool>;

    /// Executes a query, returning matching entity IDs in query order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query names an unknown field or the backend
    /// fails to read.
    fn execute(&self, query: &EntityQuery) -> Result<Vec<u64>>;

    /// Returns the number of stored logs.
    fn log_count(&self) -> usize;

    /// Returns the number of stored assets.
    fn asset_count(&self) -> usize;

    /// Returns true if the store holds no entities.
    fn is_empty(&self) -> bool {
        self.log_count() == 0 && self.asset_count() == 0
    }
}

/// Decides which entities access-checked queries may return.
pub trait AccessPolicy: Send + Sync {
    /// Returns true if the current account may view the entity.
    fn can_view(&self, entity: &dyn Entity) -> bool;
}

/// Policy that allows every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can_view(&self, _entity: &dyn Entity) -> bool {
        true
    }
}
