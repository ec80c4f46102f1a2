//! Log query construction.
//!
//! [`LogQueryFactory`] turns [`QueryCriteria`] into an [`EntityQuery`] over
//! the log collection. Results are always ordered by timestamp descending,
//! then by ID descending, so logs saved in the same second come back newest
//! first.

use std::sync::Arc;

use farm_entity::{Direction, EntityKind, EntityQuery, EntityStore, LogId};
use tracing::debug;

use crate::criteria::QueryCriteria;
use crate::error::Result;

/// Shared entity store handle.
pub type SharedStore = Arc<dyn EntityStore>;

/// Log field names used by the factory.
pub mod fields {
    /// Log bundle.
    pub const TYPE: &str = "type";
    /// Activity time in epoch seconds.
    pub const TIMESTAMP: &str = "timestamp";
    /// Workflow status.
    pub const STATUS: &str = "status";
    /// Asset references.
    pub const ASSET: &str = "asset";
    /// Log identifier.
    pub const ID: &str = "id";
}

/// Builds log queries from criteria.
#[derive(Clone)]
pub struct LogQueryFactory {
    store: SharedStore,
}

impl LogQueryFactory {
    /// Creates a factory over the given store.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Builds a query for `criteria`.
    ///
    /// The query is access-checked until [`LogQuery::access_check`] says
    /// otherwise.
    #[must_use]
    pub fn get_query(&self, criteria: &QueryCriteria) -> LogQuery {
        let mut query = EntityQuery::new(EntityKind::Log);

        if let Some(log_type) = &criteria.log_type {
            query = query.condition(fields::TYPE, log_type.as_str());
        }
        if let Some(timestamp) = criteria.timestamp {
            query = query.at_most(fields::TIMESTAMP, timestamp);
        }
        if let Some(status) = &criteria.status {
            query = query.condition(fields::STATUS, status.as_str());
        }
        if let Some(asset) = criteria.asset {
            query = query.references(fields::ASSET, asset.0);
        }

        query = query
            .sort(fields::TIMESTAMP, Direction::Desc)
            .sort(fields::ID, Direction::Desc);

        if let Some(limit) = criteria.limit {
            query = query.range(limit);
        }

        LogQuery {
            store: Arc::clone(&self.store),
            query,
        }
    }

    /// Returns the store queries run against.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

/// A built log query, ready to execute.
pub struct LogQuery {
    store: SharedStore,
    query: EntityQuery,
}

impl LogQuery {
    /// Enables or disables the store's access policy for this query.
    ///
    /// Internal aggregation runs unchecked.
    #[must_use]
    pub fn access_check(mut self, check: bool) -> Self {
        self.query = self.query.access_check(check);
        self
    }

    /// Returns the underlying entity query.
    #[must_use]
    pub const fn entity_query(&self) -> &EntityQuery {
        &self.query
    }

    /// Runs the query, returning log IDs most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the store fails.
    pub fn execute(&self) -> Result<Vec<LogId>> {
        let ids: Vec<LogId> = self
            .store
            .execute(&self.query)?
            .into_iter()
            .map(LogId)
            .collect();

        debug!(
            conditions = self.query.conditions.len(),
            limit = ?self.query.range,
            access_check = self.query.access_check,
            results = ids.len(),
            "executed log query"
        );
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_entity::{Asset, AssetId, Condition, FieldValue, Log, MemoryEntityStore};
    use proptest::prelude::*;
    use test_case::test_case;

    fn save_log(store: &MemoryEntityStore, log_type: &str, timestamp: i64) -> LogId {
        let mut log = Log::builder()
            .log_type(log_type)
            .timestamp(timestamp)
            .build_at(0)
            .expect("should build");
        store.save_log(&mut log).expect("should save")
    }

    fn factory() -> (Arc<MemoryEntityStore>, LogQueryFactory) {
        let store = Arc::new(MemoryEntityStore::new());
        let factory = LogQueryFactory::new(store.clone());
        (store, factory)
    }

    fn run(factory: &LogQueryFactory, criteria: &QueryCriteria) -> Vec<LogId> {
        factory
            .get_query(criteria)
            .access_check(false)
            .execute()
            .expect("query should run")
    }

    #[test]
    fn default_query_sorts_and_checks_access() {
        let (_, factory) = factory();
        let query = factory.get_query(&QueryCriteria::new());
        let entity_query = query.entity_query();

        assert!(entity_query.conditions.is_empty());
        assert!(entity_query.access_check);
        assert_eq!(entity_query.range, None);
        assert_eq!(entity_query.sorts.len(), 2);
        assert_eq!(entity_query.sorts[0].field, fields::TIMESTAMP);
        assert_eq!(entity_query.sorts[0].direction, Direction::Desc);
        assert_eq!(entity_query.sorts[1].field, fields::ID);
        assert_eq!(entity_query.sorts[1].direction, Direction::Desc);
    }

    #[test]
    fn criteria_become_conditions() {
        let (_, factory) = factory();
        let criteria = QueryCriteria::new()
            .with_type("foo")
            .with_timestamp(10)
            .with_status("done")
            .with_asset(AssetId(2))
            .with_limit(5);
        let query = factory.get_query(&criteria).access_check(false);
        let entity_query = query.entity_query();

        assert_eq!(
            entity_query.conditions,
            vec![
                Condition::Equals {
                    field: "type".to_string(),
                    value: FieldValue::from("foo"),
                },
                Condition::AtMost {
                    field: "timestamp".to_string(),
                    value: FieldValue::Integer(10),
                },
                Condition::Equals {
                    field: "status".to_string(),
                    value: FieldValue::from("done"),
                },
                Condition::References {
                    field: "asset".to_string(),
                    target: 2,
                },
            ]
        );
        assert_eq!(entity_query.range, Some(5));
        assert!(!entity_query.access_check);
    }

    #[test]
    fn ties_break_by_id_descending() {
        let (store, factory) = factory();
        let first = save_log(&store, "foo", 500);
        let second = save_log(&store, "bar", 500);

        assert_eq!(run(&factory, &QueryCriteria::new()), vec![second, first]);
    }

    #[test]
    fn timestamp_bound_is_inclusive() {
        let (store, factory) = factory();
        let now = 1_700_000_000;
        let current = save_log(&store, "foo", now);
        let future = save_log(&store, "foo", now + 86_400);

        let ids = run(&factory, &QueryCriteria::new().with_timestamp(now));
        assert_eq!(ids, vec![current]);
        assert!(!ids.contains(&future));
    }

    #[test_case(0, 0 ; "zero")]
    #[test_case(1, 1 ; "one")]
    #[test_case(3, 3 ; "all")]
    #[test_case(10, 3 ; "more than available")]
    fn limit_truncates(limit: usize, expected: usize) {
        let (store, factory) = factory();
        let _ = save_log(&store, "foo", 1);
        let newest = save_log(&store, "foo", 3);
        let _ = save_log(&store, "foo", 2);

        let ids = run(&factory, &QueryCriteria::new().with_limit(limit));
        assert_eq!(ids.len(), expected);
        if expected > 0 {
            assert_eq!(ids[0], newest);
        }
    }

    #[test]
    fn asset_filter_excludes_unreferenced_logs() {
        let (store, factory) = factory();
        let asset = store.save_asset(&mut Asset::new("land")).expect("save");

        let mut referencing = Log::builder()
            .log_type("foo")
            .asset(asset)
            .build_at(5)
            .expect("build");
        let referencing = store.save_log(&mut referencing).expect("save");
        let _ = save_log(&store, "foo", 6);

        let ids = run(&factory, &QueryCriteria::new().with_asset(asset));
        assert_eq!(ids, vec![referencing]);

        let ids = run(&factory, &QueryCriteria::new().with_asset(AssetId(404)));
        assert!(ids.is_empty());
    }

    proptest! {
        #[test]
        fn type_filter_is_subset_of_unfiltered(
            logs in proptest::collection::vec((0i64..20, prop::bool::ANY), 0..30)
        ) {
            let (store, factory) = factory();
            for (timestamp, is_foo) in &logs {
                let log_type = if *is_foo { "foo" } else { "bar" };
                let _ = save_log(&store, log_type, *timestamp);
            }

            let all = run(&factory, &QueryCriteria::new());
            let foo = run(&factory, &QueryCriteria::new().with_type("foo"));

            prop_assert_eq!(all.len(), logs.len());
            let expected: Vec<LogId> = all
                .iter()
                .copied()
                .filter(|id| logs[(id.0 - 1) as usize].1)
                .collect();
            prop_assert_eq!(foo, expected);
        }

        #[test]
        fn limit_takes_head_of_order(count in 0usize..20, limit in 0usize..25) {
            let (store, factory) = factory();
            for i in 0..count {
                let _ = save_log(&store, "foo", (i % 4) as i64);
            }

            let all = run(&factory, &QueryCriteria::new());
            let limited = run(&factory, &QueryCriteria::new().with_limit(limit));

            prop_assert_eq!(limited.len(), limit.min(count));
            prop_assert_eq!(&limited[..], &all[..limited.len()]);
        }
    }
}
