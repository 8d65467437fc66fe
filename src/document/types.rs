//! The billing document (tagihan) entity and its metadata records.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::DocumentStatus;

/// UUID-based document identifier.
///
/// UUIDs keep identifiers conflict-free across independent submitters; the
/// human-facing reference is the SPM number, not the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(uuid::Uuid);

impl DocumentId {
    /// Mint a fresh random identifier
    #[must_use]
    pub fn new() -> Self {
        DocumentId(uuid::Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        DocumentId(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for DocumentId {
    fn from(uuid: uuid::Uuid) -> Self {
        DocumentId(uuid)
    }
}

/// SPM document type, encoded into the composite SPM number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    /// Uang persediaan (imprest fund)
    Up,
    /// Ganti uang (imprest replenishment)
    Gu,
    /// Tambahan uang (supplementary fund)
    Tu,
    /// Langsung (direct payment)
    Ls,
}

impl DocumentType {
    /// Wire code used in the SPM composite number
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DocumentType::Up => "UP",
            DocumentType::Gu => "GU",
            DocumentType::Tu => "TU",
            DocumentType::Ls => "LS",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One verification criterion with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub criterion: String,
    pub satisfied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChecklistItem {
    #[must_use]
    pub fn satisfied(criterion: impl Into<String>) -> Self {
        Self {
            criterion: criterion.into(),
            satisfied: true,
            note: None,
        }
    }

    #[must_use]
    pub fn unsatisfied(criterion: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            criterion: criterion.into(),
            satisfied: false,
            note: Some(note.into()),
        }
    }
}

/// Whether every checklist item is satisfied (the verification pass rule)
#[must_use]
pub fn checklist_satisfied(items: &[ChecklistItem]) -> bool {
    items.iter().all(|item| item.satisfied)
}

/// Metadata written by the registrar when a document enters verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub number: String,
    pub time: DateTime<Utc>,
    pub registrar_name: String,
}

/// Metadata written by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub number: String,
    pub time: DateTime<Utc>,
    pub verifier_name: String,
    pub checklist: Vec<ChecklistItem>,
}

/// Metadata written by the corrector.
///
/// `sequence` is the raw monthly counter value; the formatted `number` is
/// derived from it once and never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRecord {
    pub number: String,
    pub sequence: u32,
    pub corrector_id: String,
    pub time: DateTime<Utc>,
    pub note: String,
}

/// SP2D metadata written by the disbursement registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementRecord {
    pub sp2d_number: String,
    pub sp2d_date: NaiveDate,
    pub sp2d_sequence: u32,
    pub bank_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_submission_date: Option<NaiveDate>,
}

/// A billing document moving through the approval pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub owning_unit_name: String,
    pub submitting_user_id: String,
    pub description: String,
    pub gross_amount: Decimal,
    pub document_type: DocumentType,
    pub claim_type: String,
    pub funding_source: String,
    pub spm_number: String,
    pub sequence_number: u32,
    pub schedule_code: String,
    pub document_date: NaiveDate,
    pub status: DocumentStatus,
    pub submission_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<CorrectionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursement: Option<DisbursementRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub editable_by_owner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_note: Option<String>,
}

impl Document {
    /// The minted verification number, if any
    #[must_use]
    pub fn verification_number(&self) -> Option<&str> {
        self.verification.as_ref().map(|v| v.number.as_str())
    }

    /// The minted registration number, if any
    #[must_use]
    pub fn registration_number(&self) -> Option<&str> {
        self.registration.as_ref().map(|r| r.number.as_str())
    }

    /// Whether a non-expired lock is currently held by someone.
    #[must_use]
    pub fn lock_is_active(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        match (&self.locked_by, self.locked_at) {
            (Some(_), Some(at)) => now - at <= timeout,
            _ => false,
        }
    }

    /// Whether `user_id` may take (or already holds) the lock: the lock is
    /// free, held by this user, or held past the stale timeout.
    #[must_use]
    pub fn lock_available_to(&self, user_id: &str, now: DateTime<Utc>, timeout: Duration) -> bool {
        match (&self.locked_by, self.locked_at) {
            (None, _) => true,
            (Some(holder), _) if holder == user_id => true,
            (Some(_), Some(at)) => now - at > timeout,
            // locked_by set without locked_at violates the invariant; treat
            // the lock as stale rather than wedging the document
            (Some(_), None) => true,
        }
    }
}
