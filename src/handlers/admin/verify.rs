use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    pub loan_info_id: Option<Uuid>,
    pub additional_document_id: Option<Uuid>,
    /// Absent means verify; `false` reverts the request to `pending`.
    pub verified: Option<bool>,
}

/// PUT /api/admin/documents/additional/verify - toggle an additional request
/// between `verified` and `pending`
pub async fn additional_verify_put(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> ApiResult<serde_json::Value> {
    let loan_info_id = body
        .loan_info_id
        .ok_or_else(|| ApiError::bad_request("loanInfoId is required"))?;
    let additional_document_id = body
        .additional_document_id
        .ok_or_else(|| ApiError::bad_request("additionalDocumentId is required"))?;

    let request = state
        .documents
        .verify_additional(
            loan_info_id,
            additional_document_id,
            body.verified.unwrap_or(true),
        )
        .await?;

    Ok(ApiResponse::success(json!({ "additionalDocument": request })))
}
