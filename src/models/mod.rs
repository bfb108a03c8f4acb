pub mod document;
pub mod loan;

pub use document::{
    AdditionalDocumentRequest, AdditionalStatus, ApplicableFor, CollectionStatus,
    DocumentCategory, DocumentCollection, DocumentRequirement, FileStatus, UploadedFile,
};
pub use loan::{ApplicantProfile, LoanApplication};
