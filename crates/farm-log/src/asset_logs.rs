//! Logs that reference an asset.
//!
//! Assets hold no back-pointer to their logs; every lookup here is a log
//! query filtered by asset reference and run without access checks.

use farm_entity::Log;
use tracing::debug;

use crate::criteria::{AssetRef, QueryCriteria};
use crate::error::Result;
use crate::query::{LogQueryFactory, SharedStore};

/// Asset → logs lookup service.
#[derive(Clone)]
pub struct AssetLogs {
    queries: LogQueryFactory,
}

impl AssetLogs {
    /// Creates the service over `store`.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            queries: LogQueryFactory::new(store),
        }
    }

    /// Returns logs referencing `asset`, most recent first.
    ///
    /// `log_type` narrows the result to one type. Assets that are unsaved
    /// or referenced by no log yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the store fails.
    pub fn get_logs(&self, asset: impl AssetRef, log_type: Option<&str>) -> Result<Vec<Log>> {
        self.lookup(asset, log_type, None, None)
    }

    /// Returns the head of [`AssetLogs::get_logs`] with no type filter.
    ///
    /// "First" follows the query order: this is the most recent log.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the store fails.
    pub fn get_first_log(&self, asset: impl AssetRef) -> Result<Option<Log>> {
        Ok(self.lookup(asset, None, None, Some(1))?.into_iter().next())
    }

    /// Returns logs referencing `asset` at or before `timestamp`, most
    /// recent first.
    ///
    /// Useful for finding the latest log that is not dated in the future.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the store fails.
    pub fn get_logs_before(
        &self,
        asset: impl AssetRef,
        log_type: Option<&str>,
        timestamp: i64,
    ) -> Result<Vec<Log>> {
        self.lookup(asset, log_type, Some(timestamp), None)
    }

    fn lookup(
        &self,
        asset: impl AssetRef,
        log_type: Option<&str>,
        timestamp: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Log>> {
        let Some(asset_id) = asset.asset_id() else {
            debug!("asset log lookup for unsaved asset");
            return Ok(Vec::new());
        };

        let criteria = QueryCriteria {
            log_type: log_type.map(str::to_string),
            timestamp,
            status: None,
            asset: Some(asset_id),
            limit,
        };

        let ids = self.queries.get_query(&criteria).access_check(false).execute()?;
        let logs = self.queries.store().load_logs(&ids)?;

        debug!(
            asset_id = asset_id.0,
            log_type = ?log_type,
            results = logs.len(),
            "looked up asset logs"
        );
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_entity::{AccessPolicy, Asset, AssetId, Entity, EntityStore, LogId, MemoryEntityStore};
    use std::sync::Arc;

    struct DenyAll;

    impl AccessPolicy for DenyAll {
        fn can_view(&self, _entity: &dyn Entity) -> bool {
            false
        }
    }

    fn save_log(store: &MemoryEntityStore, log_type: &str, timestamp: i64, asset: AssetId) -> LogId {
        let mut log = Log::builder()
            .log_type(log_type)
            .timestamp(timestamp)
            .asset(asset)
            .build_at(0)
            .expect("should build");
        store.save_log(&mut log).expect("should save")
    }

    fn setup() -> (Arc<MemoryEntityStore>, AssetLogs, Asset) {
        let store = Arc::new(MemoryEntityStore::new());
        let mut asset = Asset::new("test");
        store.save_asset(&mut asset).expect("save asset");
        let service = AssetLogs::new(store.clone());
        (store, service, asset)
    }

    fn ids(logs: &[Log]) -> Vec<LogId> {
        logs.iter().filter_map(|l| l.id).collect()
    }

    #[test]
    fn get_logs_returns_materialized_logs_in_order() {
        let (store, service, asset) = setup();
        let older = save_log(&store, "foo", 100, AssetId(1));
        let newer = save_log(&store, "bar", 200, AssetId(1));

        let logs = service.get_logs(&asset, None).expect("lookup");
        assert_eq!(ids(&logs), vec![newer, older]);
        assert_eq!(logs[0].log_type, "bar");
    }

    #[test]
    fn get_logs_filters_by_type() {
        let (store, service, asset) = setup();
        let _ = save_log(&store, "foo", 100, AssetId(1));
        let bar = save_log(&store, "bar", 200, AssetId(1));

        let logs = service.get_logs(&asset, Some("bar")).expect("lookup");
        assert_eq!(ids(&logs), vec![bar]);

        let logs = service.get_logs(&asset, Some("baz")).expect("lookup");
        assert!(logs.is_empty());
    }

    #[test]
    fn get_logs_ignores_other_assets() {
        let (store, service, asset) = setup();
        let mut other = Asset::new("test");
        let other_id = store.save_asset(&mut other).expect("save");
        let _ = save_log(&store, "foo", 100, other_id);

        assert!(service.get_logs(&asset, None).expect("lookup").is_empty());
        assert_eq!(service.get_logs(other_id, None).expect("lookup").len(), 1);
    }

    #[test]
    fn unknown_and_unsaved_assets_yield_nothing() {
        let (store, service, _) = setup();
        let _ = save_log(&store, "foo", 100, AssetId(1));

        assert!(service.get_logs(AssetId(999), None).expect("lookup").is_empty());
        assert!(service.get_first_log(AssetId(999)).expect("lookup").is_none());
        assert!(service
            .get_logs(Asset::new("test"), None)
            .expect("lookup")
            .is_empty());
    }

    #[test]
    fn first_log_is_head_of_get_logs() {
        let (store, service, asset) = setup();
        let _ = save_log(&store, "foo", 100, AssetId(1));
        let _ = save_log(&store, "bar", 300, AssetId(1));
        let _ = save_log(&store, "foo", 200, AssetId(1));

        let all = service.get_logs(&asset, None).expect("lookup");
        let first = service.get_first_log(&asset).expect("lookup");
        assert_eq!(first.as_ref(), all.first());
        assert_eq!(first.map(|l| l.timestamp), Some(300));
    }

    #[test]
    fn get_logs_before_excludes_future_logs() {
        let (store, service, asset) = setup();
        let now = 1_700_000_000;
        let current = save_log(&store, "foo", now, AssetId(1));
        let _ = save_log(&store, "foo", now + 86_400, AssetId(1));

        let logs = service.get_logs_before(&asset, None, now).expect("lookup");
        assert_eq!(ids(&logs), vec![current]);
    }

    #[test]
    fn lookups_bypass_access_policy() {
        let store = Arc::new(MemoryEntityStore::new().with_access_policy(Arc::new(DenyAll)));
        let mut asset = Asset::new("test");
        store.save_asset(&mut asset).expect("save asset");
        let _ = save_log(&store, "foo", 1, AssetId(1));

        let service = AssetLogs::new(store);
        assert_eq!(service.get_logs(&asset, None).expect("lookup").len(), 1);
    }
}
