use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a single uploaded file. Any enumerated value may move to any
/// other; validation is set-membership only (see the admin status handlers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Uploaded,
    Requested,
    Completed,
    Rejected,
    Approved,
    Review,
    Verified,
}

impl FileStatus {
    /// Parse a wire status string, rejecting anything outside the enum.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "uploaded" => Some(Self::Uploaded),
            "requested" => Some(Self::Requested),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            "approved" => Some(Self::Approved),
            "review" => Some(Self::Review),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }

    /// True for the statuses that count towards the collection roll-up.
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Verified | Self::Approved | Self::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploaded => "uploaded",
            Self::Requested => "requested",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Approved => "approved",
            Self::Review => "review",
            Self::Verified => "verified",
        }
    }
}

/// Whole-collection status, derived when every standard file is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Pending,
    Verified,
}

/// Lifecycle of an admin-requested additional document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdditionalStatus {
    Requested,
    Uploaded,
    Verified,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Identity,
    Income,
    Financial,
    Property,
    Partner,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicableFor {
    Primary,
    Partner,
    Business,
}

/// One stored file reference. `cloudinary_id` is the opaque key in external
/// object storage; placeholder entries seeded by additional-document requests
/// carry an empty url/key and status `requested`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub upload_date: DateTime<Utc>,
    pub url: String,
    pub cloudinary_id: String,
    pub status: FileStatus,
    #[serde(default)]
    pub sign_required_requested: bool,
}

impl UploadedFile {
    /// The stub entry seeded into a fresh additional-document request.
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            size: 0,
            upload_date: Utc::now(),
            url: String::new(),
            cloudinary_id: String::new(),
            status: FileStatus::Requested,
            sign_required_requested: false,
        }
    }

    /// True for the bare seed entry that has never received an upload.
    pub fn is_placeholder(&self) -> bool {
        self.url.is_empty() && self.status == FileStatus::Requested
    }
}

/// One slot from the standard catalog (or an ad-hoc slot appended inline by
/// the upload gateway). If `multiple_allowed` is false, `uploaded_files`
/// holds at most one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequirement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: DocumentCategory,
    pub required: bool,
    pub multiple_allowed: bool,
    pub applicable_for: ApplicableFor,
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
}

/// Admin-initiated document requirement outside the standard catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalDocumentRequest {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub sign_required_requested: bool,
    pub status: AdditionalStatus,
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
}

/// The per-application container of document requirements and uploads.
/// One per `(loan_info_id, user_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCollection {
    pub id: Uuid,
    pub loan_info_id: Uuid,
    pub user_id: Uuid,
    pub documents: Vec<DocumentRequirement>,
    #[serde(default)]
    pub additional_documents: Vec<AdditionalDocumentRequest>,
    pub status: CollectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentCollection {
    pub fn new(loan_info_id: Uuid, user_id: Uuid, documents: Vec<DocumentRequirement>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            loan_info_id,
            user_id,
            documents,
            additional_documents: Vec::new(),
            status: CollectionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Locate the requirement owning `file_id` plus the file itself.
    /// Scoped two-step lookup rather than a blind cross-array update, so a
    /// duplicate id in another requirement can never be touched by accident.
    pub fn find_file_mut(&mut self, file_id: Uuid) -> Option<(&mut DocumentRequirement, usize)> {
        for req in &mut self.documents {
            if let Some(idx) = req.uploaded_files.iter().position(|f| f.id == file_id) {
                return Some((req, idx));
            }
        }
        None
    }

    /// Roll-up check over the standard documents only. Additional documents
    /// never participate. Vacuously empty collections stay pending.
    pub fn all_standard_files_accepted(&self) -> bool {
        let mut seen_any = false;
        for req in &self.documents {
            for file in &req.uploaded_files {
                seen_any = true;
                if !file.status.is_accepted() {
                    return false;
                }
            }
        }
        seen_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!(FileStatus::parse("verified"), Some(FileStatus::Verified));
        assert_eq!(FileStatus::parse("done"), None);
        assert_eq!(FileStatus::parse(""), None);
        assert_eq!(FileStatus::parse("Verified"), None);
    }

    #[test]
    fn accepted_set_matches_rollup_statuses() {
        for s in [FileStatus::Verified, FileStatus::Approved, FileStatus::Completed] {
            assert!(s.is_accepted(), "{:?} should be accepted", s);
        }
        for s in [
            FileStatus::Pending,
            FileStatus::Uploaded,
            FileStatus::Requested,
            FileStatus::Rejected,
            FileStatus::Review,
        ] {
            assert!(!s.is_accepted(), "{:?} should not be accepted", s);
        }
    }

    #[test]
    fn placeholder_detection() {
        let stub = UploadedFile::placeholder();
        assert!(stub.is_placeholder());

        let mut real = UploadedFile::placeholder();
        real.url = "https://cdn.example.com/x.pdf".into();
        real.status = FileStatus::Uploaded;
        assert!(!real.is_placeholder());
    }

    #[test]
    fn empty_collection_never_rolls_up() {
        let col = DocumentCollection::new(Uuid::new_v4(), Uuid::new_v4(), vec![]);
        assert!(!col.all_standard_files_accepted());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let col = DocumentCollection::new(Uuid::new_v4(), Uuid::new_v4(), vec![]);
        let v = serde_json::to_value(&col).unwrap();
        assert!(v.get("loanInfoId").is_some());
        assert!(v.get("additionalDocuments").is_some());
        assert_eq!(v["status"], "pending");
    }
}
