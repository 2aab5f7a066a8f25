use std::path::Path;
use std::sync::Arc;

use storage::{KeyValueStore, SqliteStore};

use crate::Clock;
use crate::config::ProgressStoreConfig;
use crate::error::AppServicesError;
use crate::progress_service::ProgressStore;

/// Assembles the app-facing progress store over durable storage.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn KeyValueStore>,
    config: ProgressStoreConfig,
    progress: Arc<ProgressStore>,
}

impl AppServices {
    /// Build services backed by an `SQLite` file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub fn new_sqlite(
        db_path: &Path,
        clock: Clock,
        config: ProgressStoreConfig,
    ) -> Result<Self, AppServicesError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(db_path)?);
        Ok(Self::from_store(store, clock, config))
    }

    #[must_use]
    pub fn from_store(
        store: Arc<dyn KeyValueStore>,
        clock: Clock,
        config: ProgressStoreConfig,
    ) -> Self {
        let progress = ProgressStore::new(Arc::clone(&store))
            .with_config(config.clone())
            .with_clock(clock);
        Self {
            store,
            config,
            progress: Arc::new(progress),
        }
    }

    /// The shared progress store.
    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    /// A store over the same keys that sees time through `clock`.
    ///
    /// Used to backfill activity at past dates.
    #[must_use]
    pub fn progress_at(&self, clock: Clock) -> ProgressStore {
        ProgressStore::new(Arc::clone(&self.store))
            .with_config(self.config.clone())
            .with_clock(clock)
    }
}
