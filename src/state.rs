use std::sync::Arc;

use crate::config;
use crate::services::DocumentService;
use crate::storage::{CloudinaryStorage, MemoryStorage, ObjectStorage};
use crate::store::{DocumentStore, LoanStore, MemoryStore, PgStore, StoreError};

/// Shared handler state: the document service plus a handle to the store for
/// health checks.
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentService,
    store_for_health: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(
        document_store: Arc<dyn DocumentStore>,
        loan_store: Arc<dyn LoanStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let cfg = config::config();
        Self {
            documents: DocumentService::new(
                document_store.clone(),
                loan_store,
                storage,
                cfg.storage.upload_folder.clone(),
            ),
            store_for_health: document_store,
        }
    }

    /// Fully in-memory state for tests and storage-less development runs.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, Arc::new(MemoryStorage::new()))
    }

    /// In-memory state with a caller-held storage handle, so tests can
    /// inspect and fail the object store.
    pub fn in_memory_with_storage(storage: Arc<MemoryStorage>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, storage)
    }

    /// Production wiring: postgres when DATABASE_URL is set, plus the
    /// Cloudinary client when credentials are configured.
    pub async fn from_env() -> Result<Self, StoreError> {
        let cfg = config::config();

        let storage: Arc<dyn ObjectStorage> = if CloudinaryStorage::is_configured(&cfg.storage) {
            Arc::new(CloudinaryStorage::new(&cfg.storage))
        } else {
            tracing::warn!("object storage credentials not configured, using in-memory storage");
            Arc::new(MemoryStorage::new())
        };

        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                let store = Arc::new(PgStore::connect(&url).await?);
                Ok(Self::new(store.clone(), store, storage))
            }
            Err(_) => {
                tracing::warn!("DATABASE_URL not set, using in-memory store");
                let store = Arc::new(MemoryStore::new());
                Ok(Self::new(store.clone(), store, storage))
            }
        }
    }

    pub async fn store_ping(&self) -> Result<(), StoreError> {
        self.store_for_health.ping().await
    }
}
