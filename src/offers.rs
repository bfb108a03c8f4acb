//! Deterministic loan-offer generator. Pure arithmetic: each lender in a
//! fixed table quotes the standard annuity payment
//! `M = P * r / (1 - (1 + r)^-n)` at its base rate plus adjustments for
//! loan-to-value and self-employment. Same inputs, same quotes.

use serde::{Deserialize, Serialize};

use crate::models::ApplicantProfile;

struct Lender {
    name: &'static str,
    base_rate_pct: f64,
    origination_fee: f64,
}

const LENDERS: &[Lender] = &[
    Lender { name: "Northbank Home Finance", base_rate_pct: 3.45, origination_fee: 950.0 },
    Lender { name: "Meridian Mortgage Co", base_rate_pct: 3.61, origination_fee: 0.0 },
    Lender { name: "Cascade Lending Group", base_rate_pct: 3.38, origination_fee: 1450.0 },
    Lender { name: "Harbourstone Credit", base_rate_pct: 3.72, origination_fee: 450.0 },
    Lender { name: "Atlas Refi Partners", base_rate_pct: 3.55, origination_fee: 750.0 },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOffer {
    pub lender: String,
    pub interest_rate_pct: f64,
    pub monthly_payment: f64,
    pub total_cost: f64,
    pub origination_fee: f64,
    pub term_months: u32,
    pub pre_approved: bool,
}

/// Annuity payment for principal `p`, monthly rate `r`, `n` months.
fn monthly_payment(p: f64, r: f64, n: u32) -> f64 {
    if r == 0.0 {
        return p / n as f64;
    }
    p * r / (1.0 - (1.0 + r).powi(-(n as i32)))
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Synthesize quotes for every lender in the table, cheapest monthly payment
/// first.
pub fn generate_offers(
    amount: f64,
    property_value: f64,
    term_months: u32,
    profile: &ApplicantProfile,
) -> Vec<LoanOffer> {
    let ltv = if property_value > 0.0 { amount / property_value } else { 1.0 };

    let mut offers: Vec<LoanOffer> = LENDERS
        .iter()
        .map(|lender| {
            let mut rate_pct = lender.base_rate_pct;
            if ltv > 0.9 {
                rate_pct += 0.40;
            } else if ltv > 0.8 {
                rate_pct += 0.20;
            }
            if profile.is_self_employed {
                rate_pct += 0.25;
            }

            let monthly_rate = rate_pct / 100.0 / 12.0;
            let payment = round_cents(monthly_payment(amount, monthly_rate, term_months));
            let total = round_cents(payment * term_months as f64 + lender.origination_fee);

            LoanOffer {
                lender: lender.name.to_string(),
                interest_rate_pct: rate_pct,
                monthly_payment: payment,
                total_cost: total,
                origination_fee: lender.origination_fee,
                term_months,
                pre_approved: ltv <= 1.0,
            }
        })
        .collect();

    offers.sort_by(|a, b| a.monthly_payment.partial_cmp(&b.monthly_payment).unwrap());
    offers
}
