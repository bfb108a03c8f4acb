//! In-memory object storage used in tests and storage-less development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ObjectStorage, StorageError, StoredObject};

#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    // Flipped by tests to exercise the storage-failure path.
    fail_uploads: Arc<RwLock<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_uploads(&self, fail: bool) {
        *self.fail_uploads.write().await = fail;
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        if *self.fail_uploads.read().await {
            return Err(StorageError::Upstream("simulated upload failure".into()));
        }

        let key = format!("{}/{}-{}", folder, Uuid::new_v4(), filename);
        let url = format!("memory://{}", key);
        self.objects.write().await.insert(key.clone(), bytes);
        Ok(StoredObject { url, key })
    }

    async fn destroy(&self, key: &str) -> Result<(), StorageError> {
        match self.objects.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(format!("no object with key {}", key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_destroy() {
        let storage = MemoryStorage::new();
        let stored = storage.upload("docs", "a.pdf", vec![1, 2, 3]).await.unwrap();
        assert!(storage.contains(&stored.key).await);
        storage.destroy(&stored.key).await.unwrap();
        assert!(!storage.contains(&stored.key).await);
    }

    #[tokio::test]
    async fn destroy_missing_key_errors() {
        let storage = MemoryStorage::new();
        assert!(storage.destroy("nope").await.is_err());
    }
}
