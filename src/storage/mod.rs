//! External object storage behind a small trait. Production talks to a
//! Cloudinary-style HTTP API; tests and storage-less development use the
//! in-memory backend.

pub mod cloudinary;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::CloudinaryStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream storage error: {0}")]
    Upstream(String),
}

/// Result of a successful upload: a public URL plus the opaque key needed to
/// delete the object later.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under a folder/name pair and return its reference.
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError>;

    /// Remove an object by its opaque key.
    async fn destroy(&self, key: &str) -> Result<(), StorageError>;
}
