//! Document submission by the owning unit.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthContext, Role};
use crate::numbering::{
    compose_spm_number, ensure_unique_spm, DuplicateGuardError, DuplicateSequenceError,
    NumberingError,
};
use crate::reference::ReferenceDataService;
use crate::store::{DocumentStore, StoreError};

use super::status::DocumentStatus;
use super::types::{Document, DocumentId, DocumentType};
use super::validation::{
    require_field, require_non_negative_amount, require_positive_sequence, ValidationError,
};

/// Error type for document submission
#[derive(Error, Debug, Clone)]
pub enum CreateDocumentError {
    #[error("Role '{role}' may not submit documents")]
    RoleNotPermitted { role: Role },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateSequenceError),

    #[error("Numbering failed: {0}")]
    Numbering(#[from] NumberingError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CreateDocumentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSpm {
                sequence,
                unit,
                schedule,
                year,
            } => CreateDocumentError::Duplicate(DuplicateSequenceError {
                sequence,
                unit,
                schedule,
                year,
            }),
            other => CreateDocumentError::Store(other),
        }
    }
}

impl From<DuplicateGuardError> for CreateDocumentError {
    fn from(err: DuplicateGuardError) -> Self {
        match err {
            DuplicateGuardError::Duplicate(dup) => CreateDocumentError::Duplicate(dup),
            DuplicateGuardError::Store(store) => store.into(),
        }
    }
}

/// Options for submitting a new document
#[derive(Debug, Clone)]
pub struct CreateDocumentOptions {
    pub owning_unit_name: String,
    pub description: String,
    pub gross_amount: Decimal,
    pub document_type: DocumentType,
    pub claim_type: String,
    pub funding_source: String,
    pub sequence_number: u32,
    pub schedule_code: String,
    pub document_date: NaiveDate,
}

/// Submit a new document on behalf of the owning unit.
///
/// Validates content, composes the SPM number from reference data, runs the
/// duplicate guard, and inserts. The store's uniqueness constraint backs the
/// guard: if a concurrent submission wins the race, the insert itself fails
/// with the same duplicate-sequence error.
pub async fn create_document(
    store: &dyn DocumentStore,
    reference: &dyn ReferenceDataService,
    actor: &AuthContext,
    options: CreateDocumentOptions,
    now: DateTime<Utc>,
) -> Result<Document, CreateDocumentError> {
    if actor.role != Role::Skpd {
        return Err(CreateDocumentError::RoleNotPermitted { role: actor.role });
    }

    require_field("owning unit", &options.owning_unit_name)?;
    require_field("description", &options.description)?;
    require_field("claim type", &options.claim_type)?;
    require_field("funding source", &options.funding_source)?;
    require_field("schedule code", &options.schedule_code)?;
    require_non_negative_amount(options.gross_amount)?;
    require_positive_sequence(options.sequence_number)?;

    let spm = compose_spm_number(
        reference,
        &options.owning_unit_name,
        options.document_type,
        &options.schedule_code,
        options.sequence_number,
        options.document_date,
    )
    .await?;

    let document = Document {
        id: DocumentId::new(),
        owning_unit_name: options.owning_unit_name,
        submitting_user_id: actor.user_id.clone(),
        description: options.description,
        gross_amount: options.gross_amount,
        document_type: options.document_type,
        claim_type: options.claim_type,
        funding_source: options.funding_source,
        spm_number: spm.to_string(),
        sequence_number: options.sequence_number,
        schedule_code: options.schedule_code,
        document_date: options.document_date,
        status: DocumentStatus::AwaitingRegistration,
        submission_time: now,
        registration: None,
        verification: None,
        correction: None,
        disbursement: None,
        locked_by: None,
        locked_at: None,
        editable_by_owner: false,
        revision_deadline: None,
        revision_note: None,
    };

    ensure_unique_spm(store, &document).await?;
    store.insert(document.clone()).await?;

    info!(
        document_id = %document.id,
        spm_number = %document.spm_number,
        owning_unit = %document.owning_unit_name,
        "document submitted"
    );

    Ok(document)
}
