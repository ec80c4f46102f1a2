//! Log creation and persistence.

use chrono::Utc;
use farm_entity::{Log, LogBuilder, LogId};
use tracing::debug;

use crate::error::Result;
use crate::query::SharedStore;
use crate::workflow::StatusWorkflow;

/// Creates, saves and loads logs.
///
/// Creation stamps the request time on logs without a timestamp and applies
/// the type's default status. Saving never changes the status.
#[derive(Clone)]
pub struct LogStorage {
    store: SharedStore,
    workflow: StatusWorkflow,
}

impl LogStorage {
    /// Creates log storage over `store` using `workflow` for new logs.
    #[must_use]
    pub fn new(store: SharedStore, workflow: StatusWorkflow) -> Self {
        Self { store, workflow }
    }

    /// Builds an unsaved log.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder is missing its log type.
    pub fn create(&self, builder: LogBuilder) -> Result<Log> {
        let mut log = builder.build_at(Utc::now().timestamp())?;
        self.workflow.apply(&mut log);
        Ok(log)
    }

    /// Builds and saves a log in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be built or saved.
    pub fn create_and_save(&self, builder: LogBuilder) -> Result<Log> {
        let mut log = self.create(builder)?;
        self.save(&mut log)?;
        Ok(log)
    }

    /// Saves a log, assigning an ID on first save.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the store fails.
    pub fn save(&self, log: &mut Log) -> Result<LogId> {
        let id = self.store.save_log(log)?;
        debug!(log_id = id.0, log_type = %log.log_type, "stored log");
        Ok(id)
    }

    /// Loads a log by ID.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the store fails.
    pub fn load(&self, id: LogId) -> Result<Option<Log>> {
        Ok(self.store.load_log(id)?)
    }

    /// Returns the status workflow applied on creation.
    #[must_use]
    pub const fn workflow(&self) -> &StatusWorkflow {
        &self.workflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use farm_entity::{EntityError, MemoryEntityStore};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn storage() -> LogStorage {
        let workflow = StatusWorkflow::new(HashMap::from([
            ("foo".to_string(), "pending".to_string()),
            ("bar".to_string(), "done".to_string()),
        ]));
        LogStorage::new(Arc::new(MemoryEntityStore::new()), workflow)
    }

    #[test]
    fn create_applies_default_status_without_saving() {
        let storage = storage();

        let foo = storage.create(Log::builder().log_type("foo")).expect("create");
        assert_eq!(foo.status.as_deref(), Some("pending"));
        assert!(foo.id.is_none());

        let bar = storage.create(Log::builder().log_type("bar")).expect("create");
        assert_eq!(bar.status.as_deref(), Some("done"));
    }

    #[test]
    fn create_stamps_request_time() {
        let before = Utc::now().timestamp();
        let log = storage().create(Log::builder().log_type("foo")).expect("create");
        assert!(log.timestamp >= before);
    }

    #[test]
    fn explicit_status_survives_creation_and_saves() {
        let storage = storage();
        let mut log = storage
            .create(Log::builder().log_type("foo").status("done"))
            .expect("create");
        assert_eq!(log.status.as_deref(), Some("done"));

        let id = storage.save(&mut log).expect("save");
        log.status = Some("complete".to_string());
        storage.save(&mut log).expect("resave");

        let loaded = storage.load(id).expect("load").expect("exists");
        assert_eq!(loaded.status.as_deref(), Some("complete"));
    }

    #[test]
    fn unconfigured_type_creates_without_status() {
        let log = storage()
            .create_and_save(Log::builder().log_type("baz").timestamp(1))
            .expect("create");
        assert!(log.status.is_none());
        assert!(log.id.is_some());
    }

    #[test]
    fn create_without_type_fails() {
        let result = storage().create(Log::builder());
        assert!(matches!(
            result,
            Err(LogError::Storage(EntityError::MissingField("type")))
        ));
    }
}
