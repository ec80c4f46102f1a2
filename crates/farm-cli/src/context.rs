//! Services shared by CLI commands.

use std::path::Path;
use std::sync::Arc;

use farm_entity::{EntityStore, FileEntityStore};
use farm_log::{AssetLogs, FarmLogConfig, LogQueryFactory, LogStorage, StatusWorkflow};

use crate::error::CliError;

/// Log services wired to one file-backed store.
pub struct FarmContext {
    /// The entity store.
    pub store: Arc<dyn EntityStore>,
    /// Log creation and persistence.
    pub logs: LogStorage,
    /// Log queries.
    pub queries: LogQueryFactory,
    /// Asset log lookups.
    pub asset_logs: AssetLogs,
}

impl FarmContext {
    /// Wires the services to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, config: &FarmLogConfig) -> Self {
        let workflow = StatusWorkflow::from_config(config);
        Self {
            logs: LogStorage::new(Arc::clone(&store), workflow),
            queries: LogQueryFactory::new(Arc::clone(&store)),
            asset_logs: AssetLogs::new(Arc::clone(&store)),
            store,
        }
    }

    /// Opens the store file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn open(path: &Path, config: &FarmLogConfig) -> Result<Self, CliError> {
        let store = FileEntityStore::open(path)?;
        Ok(Self::new(Arc::new(store), config))
    }
}
