//! Persistence for loan applications and document collections.
//!
//! Every mutation of a `DocumentCollection` goes through [`DocumentStore::update`],
//! which applies the caller's closure atomically: the memory store holds its
//! write lock for the duration, the postgres store wraps a
//! `SELECT ... FOR UPDATE` round trip in one transaction. Handlers never do a
//! fetch/mutate/save cycle of their own, so concurrent admin and applicant
//! writes to the same collection cannot lose updates.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DocumentCollection, LoanApplication};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One atomic mutation of a stored collection.
pub type Mutation = Box<dyn FnOnce(&mut DocumentCollection) -> Result<(), StoreError> + Send>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a collection by owning application id.
    async fn get(&self, loan_info_id: Uuid) -> Result<Option<DocumentCollection>, StoreError>;

    /// All collections belonging to a user, newest-updated first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentCollection>, StoreError>;

    /// Persist a new collection; `Conflict` if one already exists for the
    /// same application.
    async fn insert(&self, collection: DocumentCollection) -> Result<DocumentCollection, StoreError>;

    /// Apply `mutation` to the stored collection under the store's write
    /// discipline and persist the result. `NotFound` if absent. Bumps
    /// `updated_at` on success and returns the updated record.
    async fn update(
        &self,
        loan_info_id: Uuid,
        mutation: Mutation,
    ) -> Result<DocumentCollection, StoreError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn insert(&self, loan: LoanApplication) -> Result<LoanApplication, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<LoanApplication>, StoreError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LoanApplication>, StoreError>;
}
