use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The owning loan application. Documents are collected against this record;
/// its applicant flags drive which catalog entries are seeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub has_partner: bool,
    #[serde(default)]
    pub is_self_employed: bool,
    pub loan_amount: f64,
    pub property_value: f64,
    pub term_months: u32,
    pub created_at: DateTime<Utc>,
}

impl LoanApplication {
    pub fn profile(&self) -> ApplicantProfile {
        ApplicantProfile {
            has_partner: self.has_partner,
            is_self_employed: self.is_self_employed,
        }
    }
}

/// The applicant attributes the document catalog filters on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicantProfile {
    pub has_partner: bool,
    pub is_self_employed: bool,
}
