//! File-backed entity storage.
//!
//! This module provides:
//! - [`FileEntityStore`] — Entities kept in memory and snapshotted to a JSON file
//! - Implementation of [`EntityStore`]
//!
//! Every write rewrites the snapshot through a temporary file and a rename,
//! so a crash never leaves a half-written store behind. A write that cannot
//! be persisted is undone in memory before the error is returned.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{EntityError, Result};
use crate::memory::{MemoryEntityStore, Snapshot};
use crate::query::EntityQuery;
use crate::traits::{AccessPolicy, EntityStore};
use crate::types::{Asset, AssetId, Log, LogId};

/// Entity store persisted as a single JSON snapshot.
pub struct FileEntityStore {
    path: PathBuf,
    inner: MemoryEntityStore,
    /// Serializes writes together with their snapshot flush.
    write_lock: Mutex<()>,
}

impl FileEntityStore {
    /// Opens the store at `path`, loading an existing snapshot if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or an
    /// existing snapshot cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;
            info!(
                path = %path.display(),
                assets = snapshot.assets.len(),
                logs = snapshot.logs.len(),
                "loaded entity store"
            );
            snapshot
        } else {
            debug!(path = %path.display(), "starting empty entity store");
            Snapshot {
                next_asset_id: 1,
                next_log_id: 1,
                ..Snapshot::default()
            }
        };

        Ok(Self {
            path,
            inner: MemoryEntityStore::from_snapshot(snapshot)?,
            write_lock: Mutex::new(()),
        })
    }

    /// Replaces the access policy.
    #[must_use]
    pub fn with_access_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.inner = self.inner.with_access_policy(policy);
        self
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current contents to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn flush(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write_snapshot()
    }

    /// Writes the snapshot. Callers hold `write_lock`.
    fn write_snapshot(&self) -> Result<()> {
        let snapshot = self.inner.snapshot();
        let tmp = self.path.with_extension("json.tmp");

        let written = write_json(&tmp, &snapshot)
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(EntityError::from));
        if let Err(e) = written {
            if tmp.is_file() {
                let _ = fs::remove_file(&tmp);
            }
            return Err(e);
        }

        debug!(
            path = %self.path.display(),
            assets = snapshot.assets.len(),
            logs = snapshot.logs.len(),
            "flushed entity store"
        );
        Ok(())
    }
}

fn write_json(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}

impl EntityStore for FileEntityStore {
    fn save_asset(&self, asset: &mut Asset) -> Result<AssetId> {
        let _guard = self.write_lock.lock();
        let original_id = asset.id;
        let previous = match original_id {
            Some(id) => self.inner.load_asset(id)?,
            None => None,
        };

        let id = self.inner.save_asset(asset)?;
        if let Err(e) = self.write_snapshot() {
            match previous {
                Some(previous) => self.inner.put_asset(previous),
                None => {
                    self.inner.remove_asset(id);
                }
            }
            asset.id = original_id;
            warn!(asset_id = id.0, error = %e, "asset save not persisted, rolled back");
            return Err(e);
        }
        Ok(id)
    }

    fn load_asset(&self, id: AssetId) -> Result<Option<Asset>> {
        self.inner.load_asset(id)
    }

    fn save_log(&self, log: &mut Log) -> Result<LogId> {
        let _guard = self.write_lock.lock();
        let original_id = log.id;
        let previous = match original_id {
            Some(id) => self.inner.load_log(id)?,
            None => None,
        };

        let id = self.inner.save_log(log)?;
        if let Err(e) = self.write_snapshot() {
            match previous {
                Some(previous) => self.inner.put_log(previous),
                None => {
                    self.inner.remove_log(id);
                }
            }
            log.id = original_id;
            warn!(log_id = id.0, error = %e, "log save not persisted, rolled back");
            return Err(e);
        }
        Ok(id)
    }

    fn load_log(&self, id: LogId) -> Result<Option<Log>> {
        self.inner.load_log(id)
    }

    fn load_logs(&self, ids: &[LogId]) -> Result<Vec<Log>> {
        self.inner.load_logs(ids)
    }

    fn delete_log(&self, id: LogId) -> Result<bool> {
        let _guard = self.write_lock.lock();
        let Some(removed) = self.inner.remove_log(id) else {
            return Ok(false);
        };

        if let Err(e) = self.write_snapshot() {
            self.inner.put_log(removed);
            warn!(log_id = id.0, error = %e, "log delete not persisted, rolled back");
            return Err(e);
        }
        debug!(log_id = id.0, "deleted log");
        Ok(true)
    }

    fn execute(&self, query: &EntityQuery) -> Result<Vec<u64>> {
        self.inner.execute(query)
    }

    fn log_count(&self) -> usize {
        self.inner.log_count()
    }

    fn asset_count(&self) -> usize {
        self.inner.asset_count()
    }
}
