//! Domain constraint checks shared by submission, edit, and transition paths.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error type for caller-supplied fields that fail domain constraints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("Gross amount must not be negative (got {0})")]
    NegativeAmount(Decimal),

    #[error("Sequence number must be a positive integer")]
    NonPositiveSequence,

    #[error("Verification checklist must contain at least one criterion")]
    EmptyChecklist,

    #[error("Revision deadline {deadline} must be strictly after {reference}")]
    DeadlineNotAfter {
        deadline: DateTime<Utc>,
        reference: DateTime<Utc>,
    },

    #[error("A revision deadline only applies when the document is returned")]
    DeadlineWithoutReturn,

    #[error("SP2D sequence must be a positive integer")]
    NonPositiveSp2dSequence,
}

/// Reject an empty or whitespace-only required field.
pub fn require_field(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(name));
    }
    Ok(())
}

/// Reject a negative gross amount. Zero is allowed (nil corrections exist).
pub fn require_non_negative_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(amount));
    }
    Ok(())
}

/// Reject a zero sequence number.
pub fn require_positive_sequence(sequence: u32) -> Result<(), ValidationError> {
    if sequence == 0 {
        return Err(ValidationError::NonPositiveSequence);
    }
    Ok(())
}

/// Reject a revision deadline that is not strictly after its reference time.
pub fn require_deadline_after(
    deadline: DateTime<Utc>,
    reference: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if deadline <= reference {
        return Err(ValidationError::DeadlineNotAfter {
            deadline,
            reference,
        });
    }
    Ok(())
}
