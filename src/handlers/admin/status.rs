use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::FileStatus;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatchBody {
    pub status: Option<String>,
    pub sign_required_requested: Option<bool>,
}

/// Validate the status string before anything touches the store, so an
/// invalid value is a pure no-op.
fn parse_patch(body: &StatusPatchBody) -> Result<(Option<FileStatus>, Option<bool>), ApiError> {
    let status = match &body.status {
        Some(raw) => Some(
            FileStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid status '{}'", raw)))?,
        ),
        None => None,
    };

    if status.is_none() && body.sign_required_requested.is_none() {
        return Err(ApiError::bad_request(
            "status or signRequiredRequested is required",
        ));
    }
    Ok((status, body.sign_required_requested))
}

/// PATCH /api/admin/applications/:id/documents/:doc_id - update one uploaded
/// file in the standard documents; rolls the collection up to `verified`
/// when everything is accepted.
pub async fn file_status_patch(
    State(state): State<AppState>,
    Path((loan_info_id, file_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<StatusPatchBody>,
) -> ApiResult<serde_json::Value> {
    let (status, sign_required) = parse_patch(&body)?;

    let collection = state
        .documents
        .update_file_status(loan_info_id, file_id, status, sign_required)
        .await?;

    Ok(ApiResponse::success(json!({ "documents": collection })))
}

/// PATCH /api/admin/applications/:id/additional/:doc_id - same, scoped to
/// `additionalDocuments`; never rolls up.
pub async fn additional_status_patch(
    State(state): State<AppState>,
    Path((loan_info_id, file_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<StatusPatchBody>,
) -> ApiResult<serde_json::Value> {
    let (status, sign_required) = parse_patch(&body)?;

    let collection = state
        .documents
        .update_additional_file_status(loan_info_id, file_id, status, sign_required)
        .await?;

    Ok(ApiResponse::success(json!({ "documents": collection })))
}
