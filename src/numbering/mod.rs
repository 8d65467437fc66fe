//! Sequential numbering: monthly counters, the SPM composite, and the
//! duplicate guard.

pub mod counters;
pub mod duplicate;
pub mod spm;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::document::DocumentType;
use crate::reference::{MissingReferenceDataError, ReferenceDataError, ReferenceDataService};
use crate::store::StoreError;

pub use counters::{
    next_correction_number, next_registration_number, next_verification_number, MintedCorrection,
    MintedNumber,
};
pub use duplicate::{ensure_unique_spm, DuplicateGuardError, DuplicateSequenceError};
pub use spm::{SpmNumber, SpmParseError};

/// Error type for number minting
#[derive(Error, Debug, Clone)]
pub enum NumberingError {
    #[error("Registration number '{0}' has no numeric suffix")]
    MalformedRegistrationNumber(String),

    #[error(transparent)]
    MissingReferenceData(#[from] MissingReferenceDataError),

    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceDataError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Compose the SPM number for a document from reference data.
///
/// The owning unit must resolve to its codes and the schedule must be among
/// the active schedules, otherwise numbering cannot proceed.
pub async fn compose_spm_number(
    reference: &dyn ReferenceDataService,
    owning_unit: &str,
    document_type: DocumentType,
    schedule_code: &str,
    sequence: u32,
    document_date: NaiveDate,
) -> Result<SpmNumber, NumberingError> {
    let unit = reference
        .lookup_unit(owning_unit)
        .await?
        .ok_or_else(|| MissingReferenceDataError::Unit(owning_unit.to_string()))?;

    let schedules = reference.active_schedules().await?;
    if !schedules.iter().any(|s| s.code == schedule_code) {
        return Err(MissingReferenceDataError::Schedule(schedule_code.to_string()).into());
    }

    Ok(SpmNumber {
        document_type,
        schedule_code: schedule_code.to_string(),
        unit_code: unit.unit_code,
        region_code: unit.region_code,
        sequence,
        month: document_date.month(),
        year: document_date.year(),
    })
}
