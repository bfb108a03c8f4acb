//! Postgres-backed store. Collections and applications are stored as one
//! JSONB document per row, mirroring the original document-database layout;
//! mutations run inside a transaction with `SELECT ... FOR UPDATE` so
//! concurrent writers serialize instead of losing updates.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{DocumentCollection, LoanApplication};

use super::{DocumentStore, LoanStore, Mutation, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loan_applications (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_collections (
                loan_info_id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                data JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("connected to postgres store");
        Ok(Self { pool })
    }

    fn decode_collection(data: serde_json::Value) -> Result<DocumentCollection, StoreError> {
        serde_json::from_value(data)
            .map_err(|e| StoreError::NotFound(format!("corrupt collection record: {}", e)))
    }

    fn decode_loan(data: serde_json::Value) -> Result<LoanApplication, StoreError> {
        serde_json::from_value(data)
            .map_err(|e| StoreError::NotFound(format!("corrupt application record: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, loan_info_id: Uuid) -> Result<Option<DocumentCollection>, StoreError> {
        let row = sqlx::query("SELECT data FROM document_collections WHERE loan_info_id = $1")
            .bind(loan_info_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.try_get("data")?;
                Ok(Some(Self::decode_collection(data)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentCollection>, StoreError> {
        let rows = sqlx::query(
            "SELECT data FROM document_collections WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let data: serde_json::Value = row.try_get("data")?;
            out.push(Self::decode_collection(data)?);
        }
        Ok(out)
    }

    async fn insert(
        &self,
        collection: DocumentCollection,
    ) -> Result<DocumentCollection, StoreError> {
        let data = serde_json::to_value(&collection)
            .map_err(|e| StoreError::Conflict(format!("unserializable collection: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO document_collections (loan_info_id, user_id, data, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (loan_info_id) DO NOTHING
            "#,
        )
        .bind(collection.loan_info_id)
        .bind(collection.user_id)
        .bind(&data)
        .bind(collection.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "Document collection already exists for application {}",
                collection.loan_info_id
            )));
        }
        Ok(collection)
    }

    async fn update(
        &self,
        loan_info_id: Uuid,
        mutation: Mutation,
    ) -> Result<DocumentCollection, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row =
            sqlx::query("SELECT data FROM document_collections WHERE loan_info_id = $1 FOR UPDATE")
                .bind(loan_info_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "Document collection not found for application {}",
                        loan_info_id
                    ))
                })?;

        let data: serde_json::Value = row.try_get("data")?;
        let mut collection = Self::decode_collection(data)?;

        mutation(&mut collection)?;
        collection.updated_at = Utc::now();

        let data = serde_json::to_value(&collection)
            .map_err(|e| StoreError::Conflict(format!("unserializable collection: {}", e)))?;

        sqlx::query(
            "UPDATE document_collections SET data = $2, updated_at = $3 WHERE loan_info_id = $1",
        )
        .bind(loan_info_id)
        .bind(&data)
        .bind(collection.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(collection)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LoanStore for PgStore {
    async fn insert(&self, loan: LoanApplication) -> Result<LoanApplication, StoreError> {
        let data = serde_json::to_value(&loan)
            .map_err(|e| StoreError::Conflict(format!("unserializable application: {}", e)))?;

        sqlx::query(
            "INSERT INTO loan_applications (id, user_id, data, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(&data)
        .bind(loan.created_at)
        .execute(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn get(&self, id: Uuid) -> Result<Option<LoanApplication>, StoreError> {
        let row = sqlx::query("SELECT data FROM loan_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.try_get("data")?;
                Ok(Some(Self::decode_loan(data)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LoanApplication>, StoreError> {
        let rows = sqlx::query(
            "SELECT data FROM loan_applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let data: serde_json::Value = row.try_get("data")?;
            out.push(Self::decode_loan(data)?);
        }
        Ok(out)
    }
}
