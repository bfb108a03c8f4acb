use axum::extract::Query;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::ApplicantProfile;
use crate::offers;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersQuery {
    pub amount: Option<f64>,
    pub property_value: Option<f64>,
    pub term_months: Option<u32>,
    #[serde(default)]
    pub has_partner: bool,
    #[serde(default)]
    pub is_self_employed: bool,
}

/// GET /api/offers - deterministic pre-approved lender quotes
pub async fn offers_get(Query(query): Query<OffersQuery>) -> ApiResult<serde_json::Value> {
    let amount = query
        .amount
        .filter(|v| *v > 0.0)
        .ok_or_else(|| ApiError::bad_request("amount is required and must be positive"))?;
    let property_value = query
        .property_value
        .filter(|v| *v > 0.0)
        .ok_or_else(|| ApiError::bad_request("propertyValue is required and must be positive"))?;
    let term_months = query
        .term_months
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::bad_request("termMonths is required and must be positive"))?;

    let profile = ApplicantProfile {
        has_partner: query.has_partner,
        is_self_employed: query.is_self_employed,
    };

    let offers = offers::generate_offers(amount, property_value, term_months, &profile);
    Ok(ApiResponse::success(json!({ "offers": offers })))
}
