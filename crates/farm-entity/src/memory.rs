//! In-memory entity storage.
//!
//! This module provides:
//! - [`MemoryEntityStore`] — Thread-safe store for assets and logs
//! - [`Snapshot`] — Serializable copy of a store's contents
//! - Implementation of [`EntityStore`] for generic usage

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EntityError, Result};
use crate::query::EntityQuery;
use crate::traits::{AccessPolicy, AllowAll, EntityStore};
use crate::types::{Asset, AssetId, EntityKind, Log, LogId};

/// Serializable copy of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Saved assets, ascending by ID.
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Saved logs, ascending by ID.
    #[serde(default)]
    pub logs: Vec<Log>,
    /// Next asset ID to assign.
    #[serde(default = "first_id")]
    pub next_asset_id: u64,
    /// Next log ID to assign.
    #[serde(default = "first_id")]
    pub next_log_id: u64,
}

const fn first_id() -> u64 {
    1
}

/// Thread-safe in-memory entity store.
///
/// IDs are assigned per entity type, starting at 1 and never reused.
pub struct MemoryEntityStore {
    /// Assets by ID
    assets: RwLock<BTreeMap<AssetId, Asset>>,
    /// Logs by ID
    logs: RwLock<BTreeMap<LogId, Log>>,
    /// Next asset ID counter
    next_asset_id: AtomicU64,
    /// Next log ID counter
    next_log_id: AtomicU64,
    /// Policy for access-checked queries
    access: Arc<dyn AccessPolicy>,
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEntityStore {
    /// Creates an empty store that allows all access.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assets: RwLock::new(BTreeMap::new()),
            logs: RwLock::new(BTreeMap::new()),
            next_asset_id: AtomicU64::new(1),
            next_log_id: AtomicU64::new(1),
            access: Arc::new(AllowAll),
        }
    }

    /// Rebuilds a store from a snapshot.
    ///
    /// ID counters never fall behind the largest stored ID.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::Backend`] if an entity has no ID or the ID
    /// space is exhausted.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut assets = BTreeMap::new();
        for asset in snapshot.assets {
            let id = asset.id.ok_or_else(|| {
                EntityError::Backend("snapshot contains an asset without an id".to_string())
            })?;
            assets.insert(id, asset);
        }

        let mut logs = BTreeMap::new();
        for log in snapshot.logs {
            let id = log.id.ok_or_else(|| {
                EntityError::Backend("snapshot contains a log without an id".to_string())
            })?;
            logs.insert(id, log);
        }

        let next_asset_id = next_after(assets.keys().next_back().map(|id| id.0), EntityKind::Asset)?
            .max(snapshot.next_asset_id);
        let next_log_id = next_after(logs.keys().next_back().map(|id| id.0), EntityKind::Log)?
            .max(snapshot.next_log_id);

        Ok(Self {
            assets: RwLock::new(assets),
            logs: RwLock::new(logs),
            next_asset_id: AtomicU64::new(next_asset_id),
            next_log_id: AtomicU64::new(next_log_id),
            access: Arc::new(AllowAll),
        })
    }

    /// Replaces the access policy.
    #[must_use]
    pub fn with_access_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.access = policy;
        self
    }

    /// Copies the store's contents.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            assets: self.assets.read().values().cloned().collect(),
            logs: self.logs.read().values().cloned().collect(),
            next_asset_id: self.next_asset_id.load(Ordering::Acquire),
            next_log_id: self.next_log_id.load(Ordering::Acquire),
        }
    }

    /// Removes every entity. ID counters keep counting.
    pub fn clear(&self) {
        self.assets.write().clear();
        self.logs.write().clear();
    }

    /// Inserts an asset under its existing ID, replacing any stored version.
    pub(crate) fn put_asset(&self, asset: Asset) {
        if let Some(id) = asset.id {
            self.assets.write().insert(id, asset);
        }
    }

    /// Removes an asset without touching the ID counter.
    pub(crate) fn remove_asset(&self, id: AssetId) -> Option<Asset> {
        self.assets.write().remove(&id)
    }

    /// Inserts a log under its existing ID, replacing any stored version.
    pub(crate) fn put_log(&self, log: Log) {
        if let Some(id) = log.id {
            self.logs.write().insert(id, log);
        }
    }

    /// Removes a log without touching the ID counter.
    pub(crate) fn remove_log(&self, id: LogId) -> Option<Log> {
        self.logs.write().remove(&id)
    }
}

/// The first ID after `last`, or 1 for an empty collection.
fn next_after(last: Option<u64>, kind: EntityKind) -> Result<u64> {
    match last {
        None => Ok(1),
        Some(id) => id
            .checked_add(1)
            .ok_or_else(|| EntityError::Backend(format!("{kind} id space exhausted at {id}"))),
    }
}

/// Takes the next ID from `counter`, failing once it would overflow.
fn allocate(counter: &AtomicU64, kind: EntityKind) -> Result<u64> {
    counter
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
        .map_err(|n| EntityError::Backend(format!("{kind} id space exhausted at {n}")))
}

impl EntityStore for MemoryEntityStore {
    fn save_asset(&self, asset: &mut Asset) -> Result<AssetId> {
        let mut assets = self.assets.write();

        let id = match asset.id {
            Some(id) if assets.contains_key(&id) => id,
            Some(id) => {
                return Err(EntityError::NotFound {
                    kind: EntityKind::Asset,
                    id: id.0,
                });
            }
            None => AssetId(allocate(&self.next_asset_id, EntityKind::Asset)?),
        };

        asset.id = Some(id);
        assets.insert(id, asset.clone());
        drop(assets);

        debug!(asset_id = id.0, asset_type = %asset.asset_type, "saved asset");
        Ok(id)
    }

    fn load_asset(&self, id: AssetId) -> Result<Option<Asset>> {
        Ok(self.assets.read().get(&id).cloned())
    }

    fn save_log(&self, log: &mut Log) -> Result<LogId> {
        log.dedup_assets();
        let mut logs = self.logs.write();

        let id = match log.id {
            Some(id) if logs.contains_key(&id) => id,
            Some(id) => {
                return Err(EntityError::NotFound {
                    kind: EntityKind::Log,
                    id: id.0,
                });
            }
            None => LogId(allocate(&self.next_log_id, EntityKind::Log)?),
        };

        log.id = Some(id);
        logs.insert(id, log.clone());
        drop(logs);

        debug!(
            log_id = id.0,
            log_type = %log.log_type,
            timestamp = log.timestamp,
            status = ?log.status,
            "saved log"
        );
        Ok(id)
    }

    fn load_log(&self, id: LogId) -> Result<Option<Log>> {
        Ok(self.logs.read().get(&id).cloned())
    }

    fn load_logs(&self, ids: &[LogId]) -> Result<Vec<Log>> {
        let logs = self.logs.read();
        Ok(ids.iter().filter_map(|id| logs.get(id).cloned()).collect())
    }

    fn delete_log(&self, id: LogId) -> Result<bool> {
        let removed = self.logs.write().remove(&id).is_some();
        if removed {
            debug!(log_id = id.0, "deleted log");
        }
        Ok(removed)
    }

    fn execute(&self, query: &EntityQuery) -> Result<Vec<u64>> {
        let ids = match query.kind {
            EntityKind::Asset => {
                let assets = self.assets.read();
                query.apply(assets.values(), |a: &Asset| self.access.can_view(a))?
            }
            EntityKind::Log => {
                let logs = self.logs.read();
                query.apply(logs.values(), |l: &Log| self.access.can_view(l))?
            }
        };

        trace!(
            kind = %query.kind,
            conditions = query.conditions.len(),
            access_check = query.access_check,
            results = ids.len(),
            "executed entity query"
        );
        Ok(ids)
    }

    fn log_count(&self) -> usize {
        self.logs.read().len()
    }

    fn asset_count(&self) -> usize {
        self.assets.read().len()
    }
}
