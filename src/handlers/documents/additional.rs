use axum::{
    extract::{Multipart, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::CreateAdditionalRequest;
use crate::state::AppState;

use super::upload::{read_multipart, required_uuid};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalQuery {
    pub loan_info_id: Option<Uuid>,
}

/// GET /api/documents/additional?loanInfoId= - list additional requests
pub async fn additional_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AdditionalQuery>,
) -> ApiResult<serde_json::Value> {
    let loan_info_id = query
        .loan_info_id
        .ok_or_else(|| ApiError::bad_request("loanInfoId is required"))?;

    let additional = state
        .documents
        .list_additional(loan_info_id, auth.user_id)
        .await?;
    Ok(ApiResponse::success(
        json!({ "additionalDocuments": additional }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdditionalBody {
    pub loan_info_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub requested_by: Option<String>,
    #[serde(default)]
    pub sign_required_requested: bool,
}

/// POST /api/documents/additional - admin-only request creation. The route
/// sits on the user surface, so the role check lives in the handler.
pub async fn additional_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateAdditionalBody>,
) -> ApiResult<serde_json::Value> {
    if !auth.is_admin() {
        return Err(ApiError::forbidden("Admin role required"));
    }

    let loan_info_id = body
        .loan_info_id
        .ok_or_else(|| ApiError::bad_request("loanInfoId is required"))?;
    let name = body
        .name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("name is required"))?;
    let description = body
        .description
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("description is required"))?;
    let deadline = body
        .deadline
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("deadline is required"))?;
    let requested_by = body
        .requested_by
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("requestedBy is required"))?;

    let deadline: DateTime<Utc> = deadline
        .parse()
        .map_err(|_| ApiError::bad_request("deadline must be an RFC 3339 timestamp"))?;

    let created = state
        .documents
        .create_additional(
            loan_info_id,
            CreateAdditionalRequest {
                name,
                description,
                deadline,
                requested_by,
                sign_required_requested: body.sign_required_requested,
            },
        )
        .await?;

    Ok(ApiResponse::created(json!({ "additionalDocument": created })))
}

/// POST /api/documents/additional/upload - multipart `file, loanInfoId,
/// additionalDocumentId`
pub async fn additional_upload_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<serde_json::Value> {
    let fields = read_multipart(multipart).await?;

    let file = fields
        .file
        .clone()
        .ok_or_else(|| ApiError::bad_request("file is required"))?;
    let loan_info_id = required_uuid(&fields, "loanInfoId")?;
    let additional_document_id = required_uuid(&fields, "additionalDocumentId")?;

    let uploaded = state
        .documents
        .upload_additional(loan_info_id, auth.user_id, additional_document_id, file)
        .await?;

    Ok(ApiResponse::success(json!({ "file": uploaded })))
}
