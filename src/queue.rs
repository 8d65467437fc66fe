//! Role worklist projections.
//!
//! Each queue is a deterministic predicate over the document set plus the
//! wall clock — no materialized queue table exists anywhere. Callers fetch
//! the documents (usually `store.list()`), then project.

use chrono::{DateTime, Duration, Utc};

use crate::document::{Document, DocumentStatus};
use crate::utils::same_calendar_day;

/// Documents waiting for a registrar.
#[must_use]
pub fn registrar_queue(documents: &[Document]) -> Vec<Document> {
    documents
        .iter()
        .filter(|d| d.status == DocumentStatus::AwaitingRegistration)
        .cloned()
        .collect()
}

/// The shared verification pool as seen by one reviewer.
///
/// A document is visible when it awaits verification, has no verification
/// number yet, and its lock does not exclude the user (free, own, or stale).
#[must_use]
pub fn verification_queue(
    documents: &[Document],
    user_id: &str,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Vec<Document> {
    documents
        .iter()
        .filter(|d| {
            d.status == DocumentStatus::AwaitingVerification
                && d.verification_number().is_none()
                && d.lock_available_to(user_id, now, lock_timeout)
        })
        .cloned()
        .collect()
}

/// The corrector worklist: the same pool the verifiers drain.
#[must_use]
pub fn correction_queue(
    documents: &[Document],
    user_id: &str,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Vec<Document> {
    verification_queue(documents, user_id, now, lock_timeout)
}

/// Forwarded documents waiting for their SP2D.
#[must_use]
pub fn disbursement_queue(documents: &[Document]) -> Vec<Document> {
    documents
        .iter()
        .filter(|d| d.status == DocumentStatus::Forwarded)
        .cloned()
        .collect()
}

/// Everything submitted by one owning-unit user.
#[must_use]
pub fn owner_worklist(documents: &[Document], user_id: &str) -> Vec<Document> {
    documents
        .iter()
        .filter(|d| d.submitting_user_id == user_id)
        .cloned()
        .collect()
}

/// A verifier's recent work: documents they verified today, plus returned
/// documents whose revision deadline has not yet expired.
#[must_use]
pub fn verifier_history(
    documents: &[Document],
    verifier_name: &str,
    now: DateTime<Utc>,
) -> Vec<Document> {
    documents
        .iter()
        .filter(|d| {
            d.verification.as_ref().is_some_and(|v| {
                v.verifier_name == verifier_name
                    && (same_calendar_day(v.time, now)
                        || d.revision_deadline.is_some_and(|deadline| deadline >= now))
            })
        })
        .cloned()
        .collect()
}

/// A corrector's recent work, by the same rolling window.
#[must_use]
pub fn corrector_history(
    documents: &[Document],
    corrector_id: &str,
    now: DateTime<Utc>,
) -> Vec<Document> {
    documents
        .iter()
        .filter(|d| {
            d.correction.as_ref().is_some_and(|c| {
                c.corrector_id == corrector_id
                    && (same_calendar_day(c.time, now)
                        || d.revision_deadline.is_some_and(|deadline| deadline >= now))
            })
        })
        .cloned()
        .collect()
}
