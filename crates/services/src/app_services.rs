use std::sync::Arc;

use storage::repository::Storage;

use crate::config::ProgressConfig;
use crate::error::AppServicesError;
use crate::progress_store::ProgressStore;
use crate::unlock_timer::SectionUnlocker;

/// Assembles app-facing services around one shared progress store.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressStore>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, config: ProgressConfig) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, config).await)
    }

    /// Build services over process-local storage; progress lasts as long as
    /// the process.
    pub async fn in_memory(config: ProgressConfig) -> Self {
        Self::from_storage(Storage::in_memory(), config).await
    }

    pub async fn from_storage(storage: Storage, config: ProgressConfig) -> Self {
        let progress = Arc::new(ProgressStore::open(Arc::clone(&storage.progress), config).await);
        Self { progress }
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    /// A fresh unlocker bound to the shared store; one per render tree.
    #[must_use]
    pub fn section_unlocker(&self) -> SectionUnlocker {
        SectionUnlocker::new(self.progress())
    }
}
