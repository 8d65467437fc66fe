//! Duplicate guard for the SPM uniqueness scope.
//!
//! Runs before a freshly composed SPM number is committed. The store's
//! persisted constraint is the backstop for the race two concurrent writers
//! can still lose here; the guard exists to fail early with an actionable
//! error instead of a constraint violation.

use thiserror::Error;

use crate::document::Document;
use crate::store::{DocumentStore, StoreError};

use super::spm::year_suffix;

/// Error type for a sequence collision within its scope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Sequence number {sequence} is already used for unit '{unit}', schedule '{schedule}' in {year}"
)]
pub struct DuplicateSequenceError {
    pub sequence: u32,
    pub unit: String,
    pub schedule: String,
    pub year: i32,
}

/// Error type for the duplicate guard
#[derive(Error, Debug, Clone)]
pub enum DuplicateGuardError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateSequenceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Whether two documents occupy the same uniqueness scope
/// (`sequence_number`, `owning_unit_name`, `schedule_code`, SPM year).
#[must_use]
pub fn same_spm_scope(a: &Document, b: &Document) -> bool {
    a.sequence_number == b.sequence_number
        && a.owning_unit_name == b.owning_unit_name
        && a.schedule_code == b.schedule_code
        && year_suffix(&a.spm_number) == year_suffix(&b.spm_number)
}

/// Reject `candidate` if another document (excluding `candidate` itself, for
/// edits) already occupies its uniqueness scope. The engine never
/// auto-increments around a collision; the caller prompts for a different
/// sequence number.
pub async fn ensure_unique_spm(
    store: &dyn DocumentStore,
    candidate: &Document,
) -> Result<(), DuplicateGuardError> {
    let existing = store.list().await?;
    for other in &existing {
        if other.id != candidate.id && same_spm_scope(candidate, other) {
            return Err(DuplicateSequenceError {
                sequence: candidate.sequence_number,
                unit: candidate.owning_unit_name.clone(),
                schedule: candidate.schedule_code.clone(),
                year: year_suffix(&candidate.spm_number).unwrap_or_default(),
            }
            .into());
        }
    }
    Ok(())
}

/// Map a store-level constraint violation onto the guard's error, so both
/// failure paths surface the same actionable message.
#[must_use]
pub fn duplicate_from_store(err: StoreError) -> DuplicateGuardError {
    match err {
        StoreError::DuplicateSpm {
            sequence,
            unit,
            schedule,
            year,
        } => DuplicateSequenceError {
            sequence,
            unit,
            schedule,
            year,
        }
        .into(),
        other => DuplicateGuardError::Store(other),
    }
}
