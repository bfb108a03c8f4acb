//! In-memory store used by the test suite and by storage-less development
//! runs (no DATABASE_URL configured).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{DocumentCollection, LoanApplication};

use super::{DocumentStore, LoanStore, Mutation, StoreError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Uuid, DocumentCollection>>>,
    loans: Arc<RwLock<HashMap<Uuid, LoanApplication>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, loan_info_id: Uuid) -> Result<Option<DocumentCollection>, StoreError> {
        Ok(self.collections.read().await.get(&loan_info_id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentCollection>, StoreError> {
        let mut out: Vec<DocumentCollection> = self
            .collections
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    async fn insert(
        &self,
        collection: DocumentCollection,
    ) -> Result<DocumentCollection, StoreError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(&collection.loan_info_id) {
            return Err(StoreError::Conflict(format!(
                "Document collection already exists for application {}",
                collection.loan_info_id
            )));
        }
        collections.insert(collection.loan_info_id, collection.clone());
        Ok(collection)
    }

    async fn update(
        &self,
        loan_info_id: Uuid,
        mutation: Mutation,
    ) -> Result<DocumentCollection, StoreError> {
        // Write lock held across the mutation keeps the read-modify-write atomic.
        let mut collections = self.collections.write().await;
        let collection = collections.get_mut(&loan_info_id).ok_or_else(|| {
            StoreError::NotFound(format!(
                "Document collection not found for application {}",
                loan_info_id
            ))
        })?;

        let mut staged = collection.clone();
        mutation(&mut staged)?;
        staged.updated_at = Utc::now();
        *collection = staged.clone();
        Ok(staged)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn insert(&self, loan: LoanApplication) -> Result<LoanApplication, StoreError> {
        self.loans.write().await.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn get(&self, id: Uuid) -> Result<Option<LoanApplication>, StoreError> {
        Ok(self.loans.read().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LoanApplication>, StoreError> {
        let mut out: Vec<LoanApplication> = self
            .loans
            .read()
            .await
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}
