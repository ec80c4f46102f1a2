//! Generic entity query primitive.
//!
//! An [`EntityQuery`] targets one [`EntityKind`] and carries:
//! - conjunctive [`Condition`]s (equality, inclusive ranges, reference containment)
//! - an ordered list of [`Sort`] keys
//! - an optional result range (limit)
//! - an access-check flag honored by the executing store
//!
//! Backends evaluate queries with [`EntityQuery::apply`], so filter and sort
//! semantics are identical across storage engines.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{EntityError, Result};
use crate::types::{Entity, EntityKind, FieldValue};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// A filter predicate over one field.
///
/// Multi-value fields match when any of their values satisfies the predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Field equals the value.
    Equals {
        /// Field name.
        field: String,
        /// Expected value.
        value: FieldValue,
    },
    /// Field is less than or equal to the value.
    AtMost {
        /// Field name.
        field: String,
        /// Inclusive upper bound.
        value: FieldValue,
    },
    /// Field is greater than or equal to the value.
    AtLeast {
        /// Field name.
        field: String,
        /// Inclusive lower bound.
        value: FieldValue,
    },
    /// Reference field contains the target identifier.
    References {
        /// Reference field name.
        field: String,
        /// Referenced entity identifier.
        target: u64,
    },
}

impl Condition {
    /// The field this condition inspects.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. }
            | Self::AtMost { field, .. }
            | Self::AtLeast { field, .. }
            | Self::References { field, .. } => field,
        }
    }

    fn matches(&self, values: &[FieldValue]) -> bool {
        match self {
            Self::Equals { value, .. } => values.iter().any(|v| v == value),
            Self::AtMost { value, .. } => values.iter().any(|v| same_variant(v, value) && v <= value),
            Self::AtLeast { value, .. } => values.iter().any(|v| same_variant(v, value) && v >= value),
            Self::References { target, .. } => {
                let target = FieldValue::from(*target);
                values.contains(&target)
            }
        }
    }
}

fn same_variant(a: &FieldValue, b: &FieldValue) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// A filterable, sortable query over one entity collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    /// Collection to query.
    pub kind: EntityKind,
    /// Conjunctive filter conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Sort keys, most significant first.
    #[serde(default)]
    pub sorts: Vec<Sort>,
    /// Maximum number of results.
    #[serde(default)]
    pub range: Option<usize>,
    /// Whether the store's access policy applies.
    #[serde(default = "default_access_check")]
    pub access_check: bool,
}

const fn default_access_check() -> bool {
    true
}

impl EntityQuery {
    /// Creates an unfiltered, access-checked query over `kind`.
    #[must_use]
    pub const fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
            sorts: Vec::new(),
            range: None,
            access_check: true,
        }
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.conditions.push(Condition::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Adds an inclusive upper bound.
    #[must_use]
    pub fn at_most(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.conditions.push(Condition::AtMost {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Adds an inclusive lower bound.
    #[must_use]
    pub fn at_least(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.conditions.push(Condition::AtLeast {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a reference-contains condition.
    #[must_use]
    pub fn references(mut self, field: impl Into<String>, target: u64) -> Self {
        self.conditions.push(Condition::References {
            field: field.into(),
            target,
        });
        self
    }

    /// Appends a sort key.
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sorts.push(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    /// Limits the number of results.
    #[must_use]
    pub const fn range(mut self, limit: usize) -> Self {
        self.range = Some(limit);
        self
    }

    /// Enables or disables access checking.
    #[must_use]
    pub const fn access_check(mut self, check: bool) -> Self {
        self.access_check = check;
        self
    }

    /// Checks every condition and sort field exists on the target kind.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::UnknownField`] for the first unknown field.
    pub fn validate(&self) -> Result<()> {
        let fields = self
            .conditions
            .iter()
            .map(Condition::field)
            .chain(self.sorts.iter().map(|s| s.field.as_str()));

        for field in fields {
            if !self.kind.has_field(field) {
                return Err(EntityError::UnknownField {
                    kind: self.kind,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Checks if an entity satisfies every condition.
    #[must_use]
    pub fn matches(&self, entity: &dyn Entity) -> bool {
        self.conditions.iter().all(|condition| {
            entity
                .field_values(condition.field())
                .is_some_and(|values| condition.matches(&values))
        })
    }

    /// Orders two entities by the sort keys.
    ///
    /// Each key compares the first value of the field; entities without a
    /// value sort before those with one.
    #[must_use]
    pub fn compare(&self, a: &dyn Entity, b: &dyn Entity) -> Ordering {
        for sort in &self.sorts {
            let left = first_value(a, &sort.field);
            let right = first_value(b, &sort.field);
            let ordering = match sort.direction {
                Direction::Asc => left.cmp(&right),
                Direction::Desc => right.cmp(&left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Filters, sorts and limits `entities`, returning matching identifiers.
    ///
    /// `visible` is consulted only when access checking is enabled. Entities
    /// that compare equal keep their input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query names an unknown field.
    pub fn apply<'a, E, I, F>(&self, entities: I, visible: F) -> Result<Vec<u64>>
    where
        E: Entity + 'a,
        I: IntoIterator<Item = &'a E>,
        F: Fn(&E) -> bool,
    {
        self.validate()?;

        let mut matched: Vec<&E> = entities
            .into_iter()
            .filter(|e| e.kind() == self.kind)
            .filter(|e| self.matches(*e))
            .filter(|e| !self.access_check || visible(*e))
            .collect();

        matched.sort_by(|a, b| self.compare(*a, *b));

        let limit = self.range.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .filter_map(|e| e.entity_id())
            .take(limit)
            .collect())
    }
}

fn first_value(entity: &dyn Entity, field: &str) -> Option<FieldValue> {
    entity
        .field_values(field)
        .and_then(|values| values.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetId, Log, LogId};
    use test_case::test_case;

    fn make_log(id: u64, log_type: &str, timestamp: i64, status: Option<&str>) -> Log {
        let mut log = Log::builder()
            .log_type(log_type)
            .timestamp(timestamp)
            .build_at(0)
            .expect("should build");
        log.id = Some(LogId(id));
        log.status = status.map(str::to_string);
        log
    }

    fn fixture() -> Vec<Log> {
        let mut logs = vec![
            make_log(1, "foo", 100, Some("pending")),
            make_log(2, "bar", 300, Some("done")),
            make_log(3, "foo", 200, None),
            make_log(4, "bar", 200, Some("pending")),
        ];
        logs[0].add_asset(AssetId(9));
        logs[3].add_asset(AssetId(9));
        logs
    }

    fn run(query: &EntityQuery) -> Vec<u64> {
        let logs = fixture();
        query.apply(&logs, |_| true).expect("query should run")
    }

    #[test]
    fn unfiltered_query_keeps_input_order() {
        assert_eq!(run(&EntityQuery::new(EntityKind::Log)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn sorts_apply_in_order() {
        let query = EntityQuery::new(EntityKind::Log)
            .sort("timestamp", Direction::Desc)
            .sort("id", Direction::Desc);
        assert_eq!(run(&query), vec![2, 4, 3, 1]);

        let query = EntityQuery::new(EntityKind::Log)
            .sort("timestamp", Direction::Asc)
            .sort("id", Direction::Asc);
        assert_eq!(run(&query), vec![1, 3, 4, 2]);
    }

    #[test_case("type", "foo", &[1, 3] ; "by type")]
    #[test_case("status", "pending", &[1, 4] ; "by status")]
    #[test_case("status", "complete", &[] ; "no match")]
    fn equality_conditions(field: &str, value: &str, expected: &[u64]) {
        let query = EntityQuery::new(EntityKind::Log).condition(field, value);
        assert_eq!(run(&query), expected);
    }

    #[test]
    fn at_most_is_inclusive() {
        let query = EntityQuery::new(EntityKind::Log).at_most("timestamp", 200_i64);
        assert_eq!(run(&query), vec![1, 3, 4]);
    }

    #[test]
    fn at_least_is_inclusive() {
        let query = EntityQuery::new(EntityKind::Log).at_least("timestamp", 200_i64);
        assert_eq!(run(&query), vec![2, 3, 4]);
    }

    #[test]
    fn references_matches_any_delta() {
        let query = EntityQuery::new(EntityKind::Log).references("asset", 9);
        assert_eq!(run(&query), vec![1, 4]);

        let query = EntityQuery::new(EntityKind::Log).references("asset", 10);
        assert!(run(&query).is_empty());
    }

    #[test]
    fn range_takes_head_after_sort() {
        let query = EntityQuery::new(EntityKind::Log)
            .sort("timestamp", Direction::Desc)
            .range(2);
        assert_eq!(run(&query), vec![2, 3]);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let logs = fixture();
        let query = EntityQuery::new(EntityKind::Log).condition("colour", "red");
        let result = query.apply(&logs, |_| true);
        assert!(matches!(result, Err(EntityError::UnknownField { .. })));

        let query = EntityQuery::new(EntityKind::Log).sort("colour", Direction::Asc);
        assert!(query.validate().is_err());
    }

    #[test]
    fn access_check_consults_visibility() {
        let logs = fixture();
        let hide_foo = |log: &Log| log.log_type != "foo";

        let checked = EntityQuery::new(EntityKind::Log);
        assert_eq!(checked.apply(&logs, hide_foo).expect("run"), vec![2, 4]);

        let unchecked = EntityQuery::new(EntityKind::Log).access_check(false);
        assert_eq!(unchecked.apply(&logs, hide_foo).expect("run"), vec![1, 2, 3, 4]);
    }

    #[test]
    fn range_condition_ignores_other_variants() {
        let query = EntityQuery::new(EntityKind::Log).at_most("type", 5_i64);
        assert!(run(&query).is_empty());
    }

    #[test]
    fn query_serialization() {
        let query = EntityQuery::new(EntityKind::Log)
            .condition("type", "foo")
            .sort("timestamp", Direction::Desc)
            .range(3);
        let json = serde_json::to_string(&query).expect("serialize");
        let parsed: EntityQuery = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, query);
    }
}
