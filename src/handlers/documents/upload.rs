use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::DocumentCategory;
use crate::services::FileUpload;
use crate::state::AppState;

pub(super) struct UploadFields {
    pub file: Option<FileUpload>,
    pub text: std::collections::HashMap<String, String>,
}

/// Drain a multipart body into the single `file` part plus its text fields.
pub(super) async fn read_multipart(mut multipart: Multipart) -> Result<UploadFields, ApiError> {
    let mut fields = UploadFields {
        file: None,
        text: std::collections::HashMap::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
            fields.file = Some(FileUpload {
                name: filename,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid field '{}': {}", name, e)))?;
            fields.text.insert(name, value);
        }
    }

    Ok(fields)
}

pub(super) fn required_uuid(fields: &UploadFields, name: &str) -> Result<Uuid, ApiError> {
    let raw = fields
        .text
        .get(name)
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("{} is not a valid id", name)))
}

/// POST /api/documents/upload - multipart `file, loanInfoId, documentId, category?`
pub async fn upload_post(
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
    let document_id = fields
        .text
        .get("documentId")
        .cloned()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("documentId is required"))?;

    let category = match fields.text.get("category") {
        Some(raw) if !raw.is_empty() => Some(
            serde_json::from_value::<DocumentCategory>(json!(raw))
                .map_err(|_| ApiError::bad_request("category is not a valid document category"))?,
        ),
        _ => None,
    };

    let uploaded = state
        .documents
        .upload_file(loan_info_id, auth.user_id, document_id, category, file)
        .await?;

    Ok(ApiResponse::success(json!({ "file": uploaded })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub loan_info_id: Option<Uuid>,
    pub document_id: Option<String>,
    pub file_id: Option<Uuid>,
    pub cloudinary_id: Option<String>,
}

/// DELETE /api/documents/delete - remove a file from storage and the record
pub async fn file_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<DeleteFileRequest>,
) -> ApiResult<serde_json::Value> {
    let loan_info_id = body
        .loan_info_id
        .ok_or_else(|| ApiError::bad_request("loanInfoId is required"))?;
    let document_id = body
        .document_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("documentId is required"))?;
    let file_id = body
        .file_id
        .ok_or_else(|| ApiError::bad_request("fileId is required"))?;

    state
        .documents
        .delete_file(
            loan_info_id,
            auth.user_id,
            document_id,
            file_id,
            body.cloudinary_id,
        )
        .await?;

    Ok(ApiResponse::success(json!({ "message": "File deleted" })))
}
