//! Fixed catalog of standard document requirements.
//!
//! Each entry pairs a requirement template with an inclusion rule evaluated
//! against the applicant profile at collection-creation time, so the catalog
//! and its rules are testable independently of any request handling.

use crate::models::{
    ApplicableFor, ApplicantProfile, DocumentCategory, DocumentRequirement,
};

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: DocumentCategory,
    required: bool,
    multiple_allowed: bool,
    applicable_for: ApplicableFor,
    include: fn(&ApplicantProfile) -> bool,
}

fn always(_: &ApplicantProfile) -> bool {
    true
}

fn partner(p: &ApplicantProfile) -> bool {
    p.has_partner
}

fn business(p: &ApplicantProfile) -> bool {
    p.is_self_employed
}

const CATALOG: &[CatalogEntry] = &[
    // Primary applicant: always seeded.
    CatalogEntry {
        id: "doc1",
        name: "Identity document",
        description: "Valid passport or national identity card of the applicant",
        category: DocumentCategory::Identity,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc2",
        name: "Proof of residence",
        description: "Municipal registration or a recent utility bill showing the home address",
        category: DocumentCategory::Identity,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc3",
        name: "Recent pay slips",
        description: "Pay slips for the last three months",
        category: DocumentCategory::Income,
        required: true,
        multiple_allowed: true,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc4",
        name: "Employer statement",
        description: "Signed employer statement confirming the employment contract",
        category: DocumentCategory::Income,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc5",
        name: "Annual income statement",
        description: "Most recent annual income statement or tax assessment",
        category: DocumentCategory::Income,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc6",
        name: "Bank statements",
        description: "Statements for all checking accounts covering the last three months",
        category: DocumentCategory::Financial,
        required: true,
        multiple_allowed: true,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc7",
        name: "Overview of current loans",
        description: "Statements for all running loans and credit facilities",
        category: DocumentCategory::Financial,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc8",
        name: "Property valuation report",
        description: "Recent valuation report for the property being refinanced",
        category: DocumentCategory::Property,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    CatalogEntry {
        id: "doc9",
        name: "Current mortgage statement",
        description: "Latest annual statement of the mortgage being refinanced",
        category: DocumentCategory::Property,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Primary,
        include: always,
    },
    // Partner: only when the applicant declared a partner.
    CatalogEntry {
        id: "doc10",
        name: "Partner identity document",
        description: "Valid passport or national identity card of the partner",
        category: DocumentCategory::Partner,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Partner,
        include: partner,
    },
    CatalogEntry {
        id: "doc11",
        name: "Partner pay slips",
        description: "Partner pay slips for the last three months",
        category: DocumentCategory::Partner,
        required: true,
        multiple_allowed: true,
        applicable_for: ApplicableFor::Partner,
        include: partner,
    },
    CatalogEntry {
        id: "doc12",
        name: "Partner income statement",
        description: "Most recent annual income statement of the partner",
        category: DocumentCategory::Partner,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Partner,
        include: partner,
    },
    // Business: only for self-employed applicants.
    CatalogEntry {
        id: "doc13",
        name: "Business registration extract",
        description: "Recent chamber-of-commerce extract for the business",
        category: DocumentCategory::Business,
        required: true,
        multiple_allowed: false,
        applicable_for: ApplicableFor::Business,
        include: business,
    },
    CatalogEntry {
        id: "doc14",
        name: "Annual accounts",
        description: "Annual accounts for the last two financial years",
        category: DocumentCategory::Business,
        required: true,
        multiple_allowed: true,
        applicable_for: ApplicableFor::Business,
        include: business,
    },
    CatalogEntry {
        id: "doc15",
        name: "Business tax returns",
        description: "Income or corporate tax returns for the last two years",
        category: DocumentCategory::Business,
        required: true,
        multiple_allowed: true,
        applicable_for: ApplicableFor::Business,
        include: business,
    },
];

/// Build the default requirement list for a new collection, filtered by the
/// applicant profile. Order follows the catalog.
pub fn default_documents(profile: &ApplicantProfile) -> Vec<DocumentRequirement> {
    CATALOG
        .iter()
        .filter(|entry| (entry.include)(profile))
        .map(|entry| DocumentRequirement {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            category: entry.category,
            required: entry.required,
            multiple_allowed: entry.multiple_allowed,
            applicable_for: entry.applicable_for,
            uploaded_files: Vec::new(),
        })
        .collect()
}

/// Look up a catalog template by slot id, used by the upload gateway when it
/// has to append a requirement that is missing from a stored collection.
pub fn template(document_id: &str) -> Option<DocumentRequirement> {
    CATALOG
        .iter()
        .find(|entry| entry.id == document_id)
        .map(|entry| DocumentRequirement {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            category: entry.category,
            required: entry.required,
            multiple_allowed: entry.multiple_allowed,
            applicable_for: entry.applicable_for,
            uploaded_files: Vec::new(),
        })
}
