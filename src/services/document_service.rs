//! Document collection operations: lazy creation from the catalog, the file
//! upload gateway, admin status transitions with roll-up, and the
//! additional-document request flow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog;
use crate::error::ApiError;
use crate::models::{
    AdditionalDocumentRequest, AdditionalStatus, ApplicableFor, CollectionStatus,
    DocumentCategory, DocumentCollection, DocumentRequirement, FileStatus, LoanApplication,
    UploadedFile,
};
use crate::storage::ObjectStorage;
use crate::store::{DocumentStore, LoanStore, StoreError};

/// One incoming file from a multipart request.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Admin request for a document outside the standard catalog.
#[derive(Debug, Clone)]
pub struct CreateAdditionalRequest {
    pub name: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub requested_by: String,
    pub sign_required_requested: bool,
}

#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    loans: Arc<dyn LoanStore>,
    storage: Arc<dyn ObjectStorage>,
    upload_folder: String,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        loans: Arc<dyn LoanStore>,
        storage: Arc<dyn ObjectStorage>,
        upload_folder: impl Into<String>,
    ) -> Self {
        Self {
            documents,
            loans,
            storage,
            upload_folder: upload_folder.into(),
        }
    }

    // ----- loan applications -------------------------------------------------

    pub async fn create_application(
        &self,
        loan: LoanApplication,
    ) -> Result<LoanApplication, ApiError> {
        Ok(self.loans.insert(loan).await?)
    }

    pub async fn list_applications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<LoanApplication>, ApiError> {
        Ok(self.loans.list_for_user(user_id).await?)
    }

    /// Resolve the owning application, scoped to the caller. A foreign or
    /// missing application both surface as `NotFound` so the route does not
    /// leak which applications exist.
    async fn owned_loan(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
    ) -> Result<LoanApplication, ApiError> {
        let loan = self
            .loans
            .get(loan_info_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Loan application not found"))?;
        if loan.user_id != user_id {
            return Err(ApiError::not_found("Loan application not found"));
        }
        Ok(loan)
    }

    // ----- document collections: get-or-create, list, explicit create -------

    /// Fetch the caller's collection, synthesizing it from the catalog on
    /// first read.
    pub async fn get_or_create(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
    ) -> Result<DocumentCollection, ApiError> {
        if let Some(collection) = self.documents.get(loan_info_id).await? {
            if collection.user_id != user_id {
                return Err(ApiError::not_found("Document collection not found"));
            }
            return Ok(collection);
        }

        let loan = self.owned_loan(loan_info_id, user_id).await?;
        let defaults = catalog::default_documents(&loan.profile());
        let collection = DocumentCollection::new(loan_info_id, user_id, defaults);

        match self.documents.insert(collection).await {
            Ok(created) => {
                info!(%loan_info_id, "seeded document collection from catalog");
                Ok(created)
            }
            // Lost a creation race; the other writer's record wins.
            Err(StoreError::Conflict(_)) => self
                .documents
                .get(loan_info_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Document collection not found")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DocumentCollection>, ApiError> {
        Ok(self.documents.list_for_user(user_id).await?)
    }

    /// Explicit creation endpoint; `Conflict` if the collection exists.
    pub async fn create_explicit(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
        documents: Option<Vec<DocumentRequirement>>,
    ) -> Result<DocumentCollection, ApiError> {
        let loan = self.owned_loan(loan_info_id, user_id).await?;
        let docs = match documents {
            Some(docs) => docs,
            None => catalog::default_documents(&loan.profile()),
        };
        let collection = DocumentCollection::new(loan_info_id, user_id, docs);
        Ok(self.documents.insert(collection).await?)
    }

    /// Admin lookup, unscoped by owner.
    pub async fn get_for_admin(&self, loan_info_id: Uuid) -> Result<DocumentCollection, ApiError> {
        self.documents
            .get(loan_info_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Document collection not found"))
    }

    /// Replace the whole `documents` array (PUT).
    pub async fn replace_documents(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
        documents: Vec<DocumentRequirement>,
    ) -> Result<DocumentCollection, ApiError> {
        // Materialize first so the route lazily creates like the GET does.
        self.get_or_create(loan_info_id, user_id).await?;

        let updated = self
            .documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    if collection.user_id != user_id {
                        return Err(StoreError::NotFound(
                            "Document collection not found".into(),
                        ));
                    }
                    collection.documents = documents;
                    Ok(())
                }),
            )
            .await?;
        Ok(updated)
    }

    // ----- file upload gateway ----------------------------------------------

    /// Upload a file against a standard document slot. Ownership is checked
    /// before storage is contacted; storage failure aborts before any record
    /// mutation. A slot missing from the stored collection is appended
    /// inline rather than rejected.
    pub async fn upload_file(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
        document_id: String,
        category: Option<DocumentCategory>,
        upload: FileUpload,
    ) -> Result<UploadedFile, ApiError> {
        if upload.bytes.is_empty() {
            return Err(ApiError::bad_request("No file provided"));
        }

        // Ownership check first, and materialize the collection if this is
        // the first touch for the application.
        self.get_or_create(loan_info_id, user_id).await?;

        let folder = format!("{}/{}/{}", self.upload_folder, user_id, loan_info_id);
        let size = upload.bytes.len() as i64;
        let stored = self.storage.upload(&folder, &upload.name, upload.bytes).await?;

        let file = UploadedFile {
            id: Uuid::new_v4(),
            name: upload.name,
            size,
            upload_date: Utc::now(),
            url: stored.url,
            cloudinary_id: stored.key,
            status: FileStatus::Uploaded,
            sign_required_requested: false,
        };

        let file_for_update = file.clone();
        self.documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    let requirement = match collection
                        .documents
                        .iter_mut()
                        .find(|d| d.id == document_id)
                    {
                        Some(req) => req,
                        None => {
                            collection
                                .documents
                                .push(inline_requirement(&document_id, category));
                            collection.documents.last_mut().unwrap()
                        }
                    };

                    if requirement.multiple_allowed {
                        requirement.uploaded_files.push(file_for_update);
                    } else {
                        // Single-slot documents: the new upload replaces
                        // whatever was there.
                        requirement.uploaded_files = vec![file_for_update];
                    }
                    Ok(())
                }),
            )
            .await?;

        Ok(file)
    }

    /// Remove a file from storage and from the record. Storage failures are
    /// logged and swallowed so record cleanup still proceeds; a missing file
    /// is a 404 with no side effects.
    pub async fn delete_file(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
        document_id: String,
        file_id: Uuid,
        cloudinary_id: Option<String>,
    ) -> Result<(), ApiError> {
        let collection = self.get_or_create(loan_info_id, user_id).await?;

        let requirement = collection
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .ok_or_else(|| ApiError::not_found("Document not found"))?;
        let file = requirement
            .uploaded_files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| ApiError::not_found("File not found"))?;

        let key = cloudinary_id.unwrap_or_else(|| file.cloudinary_id.clone());
        if !key.is_empty() {
            if let Err(e) = self.storage.destroy(&key).await {
                warn!(%loan_info_id, %file_id, "storage delete failed, removing record anyway: {}", e);
            }
        }

        self.documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    let requirement = collection
                        .documents
                        .iter_mut()
                        .find(|d| d.id == document_id)
                        .ok_or_else(|| StoreError::NotFound("Document not found".into()))?;
                    let before = requirement.uploaded_files.len();
                    requirement.uploaded_files.retain(|f| f.id != file_id);
                    if requirement.uploaded_files.len() == before {
                        return Err(StoreError::NotFound("File not found".into()));
                    }
                    Ok(())
                }),
            )
            .await?;

        Ok(())
    }

    // ----- status transition logic ------------------------------------------

    /// Admin status change for one uploaded file in the standard documents.
    /// The owning requirement is located by scanning for the file id, then
    /// that specific nested element is mutated. When the new status is an
    /// accepted one, the change rolls up: if every file of every standard
    /// requirement is accepted, the collection itself becomes `verified`.
    pub async fn update_file_status(
        &self,
        loan_info_id: Uuid,
        file_id: Uuid,
        status: Option<FileStatus>,
        sign_required_requested: Option<bool>,
    ) -> Result<DocumentCollection, ApiError> {
        let updated = self
            .documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    {
                        let (requirement, idx) = collection
                            .find_file_mut(file_id)
                            .ok_or_else(|| StoreError::NotFound("File not found".into()))?;
                        let file = &mut requirement.uploaded_files[idx];
                        if let Some(status) = status {
                            file.status = status;
                        }
                        if let Some(flag) = sign_required_requested {
                            file.sign_required_requested = flag;
                        }
                    }

                    if status.map(FileStatus::is_accepted).unwrap_or(false)
                        && collection.all_standard_files_accepted()
                    {
                        collection.status = CollectionStatus::Verified;
                    }
                    Ok(())
                }),
            )
            .await?;

        if updated.status == CollectionStatus::Verified {
            info!(%loan_info_id, "all standard documents accepted, collection verified");
        }
        Ok(updated)
    }

    /// Same as [`update_file_status`] but scoped to `additionalDocuments`.
    /// Never rolls up.
    pub async fn update_additional_file_status(
        &self,
        loan_info_id: Uuid,
        file_id: Uuid,
        status: Option<FileStatus>,
        sign_required_requested: Option<bool>,
    ) -> Result<DocumentCollection, ApiError> {
        let updated = self
            .documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    let file = collection
                        .additional_documents
                        .iter_mut()
                        .flat_map(|req| req.uploaded_files.iter_mut())
                        .find(|f| f.id == file_id)
                        .ok_or_else(|| StoreError::NotFound("File not found".into()))?;
                    if let Some(status) = status {
                        file.status = status;
                    }
                    if let Some(flag) = sign_required_requested {
                        file.sign_required_requested = flag;
                    }
                    Ok(())
                }),
            )
            .await?;
        Ok(updated)
    }

    // ----- additional-document request flow ---------------------------------

    pub async fn list_additional(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<AdditionalDocumentRequest>, ApiError> {
        let collection = self.get_or_create(loan_info_id, user_id).await?;
        Ok(collection.additional_documents)
    }

    /// Admin-initiated request for a document outside the catalog. Creates
    /// the parent collection (seeded from the catalog) when it does not exist
    /// yet, then appends the request with one placeholder file entry.
    pub async fn create_additional(
        &self,
        loan_info_id: Uuid,
        request: CreateAdditionalRequest,
    ) -> Result<AdditionalDocumentRequest, ApiError> {
        let loan = self
            .loans
            .get(loan_info_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Loan application not found"))?;

        if self.documents.get(loan_info_id).await?.is_none() {
            let defaults = catalog::default_documents(&loan.profile());
            let collection = DocumentCollection::new(loan_info_id, loan.user_id, defaults);
            match self.documents.insert(collection).await {
                Ok(_) | Err(StoreError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let additional = AdditionalDocumentRequest {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            deadline: request.deadline,
            requested_by: request.requested_by.to_lowercase(),
            requested_at: Utc::now(),
            sign_required_requested: request.sign_required_requested,
            status: AdditionalStatus::Requested,
            uploaded_files: vec![UploadedFile::placeholder()],
        };

        let appended = additional.clone();
        self.documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    collection.additional_documents.push(appended);
                    Ok(())
                }),
            )
            .await?;

        info!(%loan_info_id, additional_id = %additional.id, "additional document requested");
        Ok(additional)
    }

    /// Applicant upload against an additional-document request. Unlike the
    /// standard path, a missing target is rejected, not created.
    pub async fn upload_additional(
        &self,
        loan_info_id: Uuid,
        user_id: Uuid,
        additional_document_id: Uuid,
        upload: FileUpload,
    ) -> Result<UploadedFile, ApiError> {
        if upload.bytes.is_empty() {
            return Err(ApiError::bad_request("No file provided"));
        }

        self.owned_loan(loan_info_id, user_id).await?;
        let collection = self
            .documents
            .get(loan_info_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Document collection not found"))?;
        if collection.user_id != user_id {
            return Err(ApiError::not_found("Document collection not found"));
        }
        // Check the target before contacting storage, so a bad id cannot
        // orphan an uploaded object.
        if !collection
            .additional_documents
            .iter()
            .any(|r| r.id == additional_document_id)
        {
            return Err(ApiError::not_found("Additional document request not found"));
        }

        let folder = format!("{}/{}/{}", self.upload_folder, user_id, loan_info_id);
        let size = upload.bytes.len() as i64;
        let stored = self.storage.upload(&folder, &upload.name, upload.bytes).await?;

        let file = UploadedFile {
            id: Uuid::new_v4(),
            name: upload.name,
            size,
            upload_date: Utc::now(),
            url: stored.url,
            cloudinary_id: stored.key,
            status: FileStatus::Uploaded,
            sign_required_requested: false,
        };

        let file_for_update = file.clone();
        self.documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    let request = collection
                        .additional_documents
                        .iter_mut()
                        .find(|r| r.id == additional_document_id)
                        .ok_or_else(|| {
                            StoreError::NotFound("Additional document request not found".into())
                        })?;

                    // First real upload replaces the seeded stub; later ones
                    // append alongside.
                    if request.uploaded_files.len() == 1
                        && request.uploaded_files[0].is_placeholder()
                    {
                        request.uploaded_files.clear();
                    }
                    request.uploaded_files.push(file_for_update);
                    request.status = AdditionalStatus::Uploaded;
                    Ok(())
                }),
            )
            .await?;

        Ok(file)
    }

    /// Toggle an additional-document request between `verified` and
    /// `pending`. Individual file entries are untouched.
    pub async fn verify_additional(
        &self,
        loan_info_id: Uuid,
        additional_document_id: Uuid,
        verified: bool,
    ) -> Result<AdditionalDocumentRequest, ApiError> {
        let updated = self
            .documents
            .update(
                loan_info_id,
                Box::new(move |collection| {
                    let request = collection
                        .additional_documents
                        .iter_mut()
                        .find(|r| r.id == additional_document_id)
                        .ok_or_else(|| {
                            StoreError::NotFound("Additional document request not found".into())
                        })?;
                    request.status = if verified {
                        AdditionalStatus::Verified
                    } else {
                        AdditionalStatus::Pending
                    };
                    Ok(())
                }),
            )
            .await?;

        updated
            .additional_documents
            .into_iter()
            .find(|r| r.id == additional_document_id)
            .ok_or_else(|| ApiError::not_found("Additional document request not found"))
    }
}

/// Slot appended by the upload gateway when the target is missing from the
/// stored collection: a catalog template when the id is known, otherwise an
/// ad-hoc requirement under the given category.
fn inline_requirement(
    document_id: &str,
    category: Option<DocumentCategory>,
) -> DocumentRequirement {
    if let Some(template) = catalog::template(document_id) {
        return template;
    }
    DocumentRequirement {
        id: document_id.to_string(),
        name: document_id.to_string(),
        description: String::new(),
        category: category.unwrap_or(DocumentCategory::Financial),
        required: false,
        multiple_allowed: true,
        applicable_for: ApplicableFor::Primary,
        uploaded_files: Vec::new(),
    }
}
