use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::LoanApplication;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[serde(default)]
    pub has_partner: bool,
    #[serde(default)]
    pub is_self_employed: bool,
    pub loan_amount: Option<f64>,
    pub property_value: Option<f64>,
    pub term_months: Option<u32>,
}

/// POST /api/applications - create a loan application owned by the caller
pub async fn application_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateApplicationRequest>,
) -> ApiResult<serde_json::Value> {
    let loan_amount = body
        .loan_amount
        .filter(|v| *v > 0.0)
        .ok_or_else(|| ApiError::bad_request("loanAmount is required and must be positive"))?;
    let property_value = body
        .property_value
        .filter(|v| *v > 0.0)
        .ok_or_else(|| ApiError::bad_request("propertyValue is required and must be positive"))?;
    let term_months = body
        .term_months
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::bad_request("termMonths is required and must be positive"))?;

    let loan = LoanApplication {
        id: Uuid::new_v4(),
        user_id: auth.user_id,
        has_partner: body.has_partner,
        is_self_employed: body.is_self_employed,
        loan_amount,
        property_value,
        term_months,
        created_at: Utc::now(),
    };

    let created = state.documents.create_application(loan).await?;
    Ok(ApiResponse::created(json!({ "application": created })))
}

/// GET /api/applications - list the caller's applications, newest first
pub async fn application_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<serde_json::Value> {
    let applications = state.documents.list_applications(auth.user_id).await?;
    Ok(ApiResponse::success(json!({ "applications": applications })))
}
