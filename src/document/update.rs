//! Owner-side content edits and hard deletion.
//!
//! Edits never change status; resubmission after a return is a workflow
//! transition. Every write here is still a guarded single update so a
//! registrar or verifier acting concurrently cannot be overwritten.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::auth::AuthContext;
use crate::numbering::{
    compose_spm_number, ensure_unique_spm, DuplicateGuardError, DuplicateSequenceError,
    NumberingError,
};
use crate::reference::ReferenceDataService;
use crate::store::{DocumentStore, StoreError, UpdateGuard};

use super::status::DocumentStatus;
use super::types::{Document, DocumentId, DocumentType};
use super::validation::{
    require_field, require_non_negative_amount, require_positive_sequence, ValidationError,
};

/// Error type for owner edits, deletion, and reads
#[derive(Error, Debug, Clone)]
pub enum DocumentCrudError {
    #[error("Document {0} not found")]
    NotFound(DocumentId),

    #[error("Only the submitting unit may modify this document")]
    NotOwner,

    #[error("Document is not editable in status '{0}'")]
    NotEditable(DocumentStatus),

    #[error("Documents can only be deleted while awaiting registration (current status: {0})")]
    NotDeletable(DocumentStatus),

    #[error("The revision window closed at {deadline}; the document can no longer be edited")]
    RevisionWindowClosed { deadline: DateTime<Utc> },

    #[error("Document changed underneath this operation; refetch and retry")]
    StaleState,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateSequenceError),

    #[error("Numbering failed: {0}")]
    Numbering(#[from] NumberingError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DocumentCrudError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DocumentCrudError::NotFound(id),
            StoreError::DuplicateSpm {
                sequence,
                unit,
                schedule,
                year,
            } => DocumentCrudError::Duplicate(DuplicateSequenceError {
                sequence,
                unit,
                schedule,
                year,
            }),
            other => DocumentCrudError::Store(other),
        }
    }
}

impl From<DuplicateGuardError> for DocumentCrudError {
    fn from(err: DuplicateGuardError) -> Self {
        match err {
            DuplicateGuardError::Duplicate(dup) => DocumentCrudError::Duplicate(dup),
            DuplicateGuardError::Store(store) => store.into(),
        }
    }
}

/// Options for an owner content edit. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentOptions {
    pub description: Option<String>,
    pub gross_amount: Option<Decimal>,
    pub document_type: Option<DocumentType>,
    pub claim_type: Option<String>,
    pub funding_source: Option<String>,
    pub sequence_number: Option<u32>,
    pub schedule_code: Option<String>,
    pub document_date: Option<NaiveDate>,
}

impl UpdateDocumentOptions {
    /// Whether the edit touches a field encoded into the SPM number.
    fn changes_numbering_scope(&self) -> bool {
        self.document_type.is_some()
            || self.sequence_number.is_some()
            || self.schedule_code.is_some()
            || self.document_date.is_some()
    }
}

/// Check that the acting user owns the document and that its status (and, in
/// `Returned`, the revision window) permits an owner edit.
fn check_owner_editable(
    document: &Document,
    actor: &AuthContext,
    now: DateTime<Utc>,
) -> Result<(), DocumentCrudError> {
    if document.submitting_user_id != actor.user_id {
        return Err(DocumentCrudError::NotOwner);
    }

    match document.status {
        DocumentStatus::AwaitingRegistration | DocumentStatus::UnderReview => Ok(()),
        DocumentStatus::Returned => {
            if !document.editable_by_owner {
                return Err(DocumentCrudError::NotEditable(document.status));
            }
            if let Some(deadline) = document.revision_deadline {
                // Past the deadline editable_by_owner is treated as expired
                if now > deadline {
                    return Err(DocumentCrudError::RevisionWindowClosed { deadline });
                }
            }
            Ok(())
        }
        status => Err(DocumentCrudError::NotEditable(status)),
    }
}

/// Apply an owner content edit.
pub async fn update_document(
    store: &dyn DocumentStore,
    reference: &dyn ReferenceDataService,
    actor: &AuthContext,
    id: DocumentId,
    options: UpdateDocumentOptions,
    now: DateTime<Utc>,
) -> Result<Document, DocumentCrudError> {
    let current = store.get(id).await?;
    check_owner_editable(&current, actor, now)?;

    let mut updated = current.clone();
    if let Some(description) = options.description.clone() {
        updated.description = description;
    }
    if let Some(amount) = options.gross_amount {
        updated.gross_amount = amount;
    }
    if let Some(document_type) = options.document_type {
        updated.document_type = document_type;
    }
    if let Some(claim_type) = options.claim_type.clone() {
        updated.claim_type = claim_type;
    }
    if let Some(funding_source) = options.funding_source.clone() {
        updated.funding_source = funding_source;
    }
    if let Some(sequence) = options.sequence_number {
        updated.sequence_number = sequence;
    }
    if let Some(schedule) = options.schedule_code.clone() {
        updated.schedule_code = schedule;
    }
    if let Some(date) = options.document_date {
        updated.document_date = date;
    }

    require_field("description", &updated.description)?;
    require_field("claim type", &updated.claim_type)?;
    require_field("funding source", &updated.funding_source)?;
    require_field("schedule code", &updated.schedule_code)?;
    require_non_negative_amount(updated.gross_amount)?;
    require_positive_sequence(updated.sequence_number)?;

    if options.changes_numbering_scope() {
        let spm = compose_spm_number(
            reference,
            &updated.owning_unit_name,
            updated.document_type,
            &updated.schedule_code,
            updated.sequence_number,
            updated.document_date,
        )
        .await?;
        updated.spm_number = spm.to_string();
        ensure_unique_spm(store, &updated).await?;
    }

    let guard = UpdateGuard::status(current.status);
    if !store.update_where(id, &guard, updated.clone(), &[]).await? {
        return Err(DocumentCrudError::StaleState);
    }

    info!(document_id = %id, "document content updated by owner");
    Ok(updated)
}

/// Hard-delete a document. Only the owner may do this, and only while the
/// document is still awaiting registration.
pub async fn delete_document(
    store: &dyn DocumentStore,
    actor: &AuthContext,
    id: DocumentId,
) -> Result<(), DocumentCrudError> {
    let current = store.get(id).await?;
    if current.submitting_user_id != actor.user_id {
        return Err(DocumentCrudError::NotOwner);
    }
    if current.status != DocumentStatus::AwaitingRegistration {
        return Err(DocumentCrudError::NotDeletable(current.status));
    }

    let guard = UpdateGuard::status(DocumentStatus::AwaitingRegistration);
    if !store.delete_where(id, &guard).await? {
        return Err(DocumentCrudError::StaleState);
    }

    info!(document_id = %id, "document deleted by owner");
    Ok(())
}
