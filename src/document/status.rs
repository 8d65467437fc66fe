//! Document lifecycle status.
//!
//! One explicit tagged status per document. Readers never reconstruct state
//! from nullable metadata fields; the workflow module is the only writer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for status parsing
#[derive(Error, Debug, Clone)]
#[error("Unknown document status '{status}'")]
pub struct StatusParseError {
    pub status: String,
}

/// Lifecycle status of a billing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    /// Submitted by the owning unit, waiting for a registrar
    AwaitingRegistration,
    /// Sent back by the registrar for revision before verification
    UnderReview,
    /// Registered, waiting in the shared verification pool
    AwaitingVerification,
    /// Verification passed, forwarded for disbursement
    Forwarded,
    /// Returned to the owning unit by a verifier or corrector
    Returned,
    /// SP2D recorded. Terminal: no further mutation is accepted.
    Completed,
}

impl DocumentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::AwaitingRegistration => "awaiting-registration",
            DocumentStatus::UnderReview => "under-review",
            DocumentStatus::AwaitingVerification => "awaiting-verification",
            DocumentStatus::Forwarded => "forwarded",
            DocumentStatus::Returned => "returned",
            DocumentStatus::Completed => "completed",
        }
    }

    /// Whether this status accepts no further transitions or edits.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Completed)
    }

    /// Whether the owning unit may edit document content in this status.
    ///
    /// `Returned` additionally requires the revision-control fields to allow
    /// the edit; callers check those separately.
    #[must_use]
    pub fn owner_may_edit(&self) -> bool {
        matches!(
            self,
            DocumentStatus::AwaitingRegistration
                | DocumentStatus::UnderReview
                | DocumentStatus::Returned
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting-registration" => Ok(DocumentStatus::AwaitingRegistration),
            "under-review" => Ok(DocumentStatus::UnderReview),
            "awaiting-verification" => Ok(DocumentStatus::AwaitingVerification),
            "forwarded" => Ok(DocumentStatus::Forwarded),
            "returned" => Ok(DocumentStatus::Returned),
            "completed" => Ok(DocumentStatus::Completed),
            other => Err(StatusParseError {
                status: other.to_string(),
            }),
        }
    }
}
