use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::DocumentRequirement;
use crate::state::AppState;

/// GET /api/documents - all of the caller's collections, newest-updated first
pub async fn collection_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<serde_json::Value> {
    let collections = state.documents.list_for_user(auth.user_id).await?;
    Ok(ApiResponse::success(json!({ "documents": collections })))
}

/// GET /api/documents/:loan_info_id - fetch, lazily creating from the catalog
pub async fn collection_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(loan_info_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let collection = state
        .documents
        .get_or_create(loan_info_id, auth.user_id)
        .await?;
    Ok(ApiResponse::success(json!({ "documents": collection })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub documents: Option<Vec<DocumentRequirement>>,
}

/// POST /api/documents/:loan_info_id - explicit creation, conflict if present
pub async fn collection_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(loan_info_id): Path<Uuid>,
    body: Option<Json<CreateCollectionRequest>>,
) -> ApiResult<serde_json::Value> {
    let documents = body.and_then(|Json(b)| b.documents);
    let collection = state
        .documents
        .create_explicit(loan_info_id, auth.user_id, documents)
        .await?;
    Ok(ApiResponse::created(json!({ "documents": collection })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceDocumentsRequest {
    pub documents: Option<Vec<DocumentRequirement>>,
}

/// PUT /api/documents/:loan_info_id - replace the whole documents array
pub async fn collection_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(loan_info_id): Path<Uuid>,
    Json(body): Json<ReplaceDocumentsRequest>,
) -> ApiResult<serde_json::Value> {
    let documents = body
        .documents
        .ok_or_else(|| ApiError::bad_request("documents is required"))?;
    let collection = state
        .documents
        .replace_documents(loan_info_id, auth.user_id, documents)
        .await?;
    Ok(ApiResponse::success(json!({ "documents": collection })))
}
