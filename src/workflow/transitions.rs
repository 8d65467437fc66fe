//! The lifecycle state machine.
//!
//! Every transition is one guarded store update: check the expected
//! pre-state, write the role's metadata, clear what must not survive. A
//! guard that matches zero rows surfaces [`TransitionError::StaleState`] and
//! the caller decides whether to refetch and retry — the engine never
//! retries on its own.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthContext, Role};
use crate::document::{
    checklist_satisfied, ChecklistItem, CorrectionRecord, DisbursementRecord, Document, DocumentId,
    DocumentStatus, RegistrationRecord, ValidationError, VerificationRecord,
};
use crate::document::validation::{require_deadline_after, require_field};
use crate::numbering::{
    next_correction_number, next_registration_number, next_verification_number, NumberingError,
};
use crate::store::{DocumentStore, LockCondition, StoreError, UpdateGuard};

use super::events::{emit_transition, DomainEvent, NotificationService};

/// Error type for workflow transitions
#[derive(Error, Debug, Clone)]
pub enum TransitionError {
    #[error("Document {0} not found")]
    NotFound(DocumentId),

    #[error("Document is not in the expected state: expected '{expected}', found '{actual}'")]
    StaleState {
        expected: DocumentStatus,
        actual: DocumentStatus,
    },

    #[error("Role '{role}' may not perform this transition")]
    RoleNotPermitted { role: Role },

    #[error("Only the submitting unit may resubmit this document")]
    NotOwner,

    #[error("This document is being processed by another reviewer ({holder})")]
    Locked { holder: String },

    #[error("Document is no longer editable by its owner")]
    NotEditable,

    #[error("The revision window closed at {deadline}")]
    RevisionWindowClosed { deadline: DateTime<Utc> },

    #[error("Document has no registration number; it cannot be corrected")]
    NotRegistered,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Numbering failed: {0}")]
    Numbering(#[from] NumberingError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for TransitionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => TransitionError::NotFound(id),
            other => TransitionError::Store(other),
        }
    }
}

fn require_role(actor: &AuthContext, role: Role) -> Result<(), TransitionError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(TransitionError::RoleNotPermitted { role: actor.role })
    }
}

fn require_status(
    document: &Document,
    expected: DocumentStatus,
) -> Result<(), TransitionError> {
    if document.status == expected {
        Ok(())
    } else {
        Err(TransitionError::StaleState {
            expected,
            actual: document.status,
        })
    }
}

/// Diagnose a zero-row conditional update: either the status moved or the
/// lock is held by someone else.
async fn stale_or_locked(
    store: &dyn DocumentStore,
    id: DocumentId,
    expected: DocumentStatus,
    actor_user_id: &str,
) -> TransitionError {
    match store.get(id).await {
        Ok(current) => {
            if current.status != expected {
                TransitionError::StaleState {
                    expected,
                    actual: current.status,
                }
            } else {
                let holder = current
                    .locked_by
                    .filter(|h| h != actor_user_id)
                    .unwrap_or_else(|| "unknown".to_string());
                TransitionError::Locked { holder }
            }
        }
        Err(err) => err.into(),
    }
}

/// Register an incoming document: `AwaitingRegistration -> AwaitingVerification`.
///
/// Mints the monthly registration number and stamps the registrar's name.
pub async fn register(
    store: &dyn DocumentStore,
    notifier: &dyn NotificationService,
    actor: &AuthContext,
    id: DocumentId,
    now: DateTime<Utc>,
) -> Result<Document, TransitionError> {
    require_role(actor, Role::Registrar)?;
    let current = store.get(id).await?;
    require_status(&current, DocumentStatus::AwaitingRegistration)?;

    let minted = next_registration_number(store, now).await?;

    let mut updated = current.clone();
    updated.status = DocumentStatus::AwaitingVerification;
    updated.registration = Some(RegistrationRecord {
        number: minted.formatted.clone(),
        time: now,
        registrar_name: actor.display_name.clone(),
    });

    let guard = UpdateGuard::status(DocumentStatus::AwaitingRegistration);
    if !store
        .update_where(id, &guard, updated.clone(), &[minted.issued])
        .await?
    {
        return Err(stale_or_locked(store, id, DocumentStatus::AwaitingRegistration, &actor.user_id).await);
    }

    info!(
        document_id = %id,
        registration_number = %minted.formatted,
        registrar = %actor.display_name,
        "document registered"
    );
    let event = DomainEvent {
        document_id: id,
        new_status: updated.status,
        actor: actor.user_id.clone(),
    };
    let message = format!(
        "Document {} registered as {}",
        updated.spm_number, minted.formatted
    );
    emit_transition(notifier, &event, &updated.submitting_user_id, &message).await;

    Ok(updated)
}

/// Send an unregistered document back to its owner:
/// `AwaitingRegistration -> UnderReview`.
///
/// Clears any registration metadata so nothing stale survives into the
/// revision round.
pub async fn send_back_for_revision(
    store: &dyn DocumentStore,
    notifier: &dyn NotificationService,
    actor: &AuthContext,
    id: DocumentId,
    note: Option<String>,
) -> Result<Document, TransitionError> {
    require_role(actor, Role::Registrar)?;
    let current = store.get(id).await?;
    require_status(&current, DocumentStatus::AwaitingRegistration)?;

    let mut updated = current.clone();
    updated.status = DocumentStatus::UnderReview;
    updated.registration = None;
    updated.revision_note = note;

    let guard = UpdateGuard::status(DocumentStatus::AwaitingRegistration);
    if !store.update_where(id, &guard, updated.clone(), &[]).await? {
        return Err(stale_or_locked(store, id, DocumentStatus::AwaitingRegistration, &actor.user_id).await);
    }

    info!(document_id = %id, registrar = %actor.display_name, "document sent back for revision");
    let event = DomainEvent {
        document_id: id,
        new_status: updated.status,
        actor: actor.user_id.clone(),
    };
    let message = format!(
        "Document {} was sent back for revision before registration",
        updated.spm_number
    );
    emit_transition(notifier, &event, &updated.submitting_user_id, &message).await;

    Ok(updated)
}

/// Resubmit a revised document: `UnderReview -> AwaitingVerification`, or
/// `Returned -> AwaitingVerification` while the revision window is open.
///
/// Clears verification and correction metadata so the document re-enters the
/// shared verification pool; the minted numbers stay recorded in the store
/// ledger and are never reissued.
pub async fn resubmit(
    store: &dyn DocumentStore,
    notifier: &dyn NotificationService,
    actor: &AuthContext,
    id: DocumentId,
    now: DateTime<Utc>,
) -> Result<Document, TransitionError> {
    require_role(actor, Role::Skpd)?;
    let current = store.get(id).await?;
    if current.submitting_user_id != actor.user_id {
        return Err(TransitionError::NotOwner);
    }

    let pre_state = match current.status {
        DocumentStatus::UnderReview => DocumentStatus::UnderReview,
        DocumentStatus::Returned => {
            if !current.editable_by_owner {
                return Err(TransitionError::NotEditable);
            }
            if let Some(deadline) = current.revision_deadline {
                if now > deadline {
                    return Err(TransitionError::RevisionWindowClosed { deadline });
                }
            }
            DocumentStatus::Returned
        }
        actual => {
            return Err(TransitionError::StaleState {
                expected: DocumentStatus::Returned,
                actual,
            })
        }
    };

    let mut updated = current.clone();
    updated.status = DocumentStatus::AwaitingVerification;
    updated.verification = None;
    updated.correction = None;
    updated.editable_by_owner = false;
    updated.revision_deadline = None;
    updated.revision_note = None;
    updated.locked_by = None;
    updated.locked_at = None;

    let guard = UpdateGuard::status(pre_state);
    if !store.update_where(id, &guard, updated.clone(), &[]).await? {
        return Err(stale_or_locked(store, id, pre_state, &actor.user_id).await);
    }

    info!(document_id = %id, "document resubmitted for verification");
    let event = DomainEvent {
        document_id: id,
        new_status: updated.status,
        actor: actor.user_id.clone(),
    };
    let message = format!(
        "Document {} was resubmitted for verification",
        updated.spm_number
    );
    emit_transition(notifier, &event, &updated.submitting_user_id, &message).await;

    Ok(updated)
}

/// Verify a document against its checklist:
/// `AwaitingVerification -> Forwarded` when every criterion is satisfied,
/// `AwaitingVerification -> Returned` otherwise.
///
/// Mints the monthly verification number and releases the verifier's lock as
/// part of the same atomic update.
pub async fn verify(
    store: &dyn DocumentStore,
    notifier: &dyn NotificationService,
    actor: &AuthContext,
    id: DocumentId,
    checklist: Vec<ChecklistItem>,
    revision_deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Result<Document, TransitionError> {
    require_role(actor, Role::Verifier)?;
    let current = store.get(id).await?;
    require_status(&current, DocumentStatus::AwaitingVerification)?;
    if !current.lock_available_to(&actor.user_id, now, lock_timeout) {
        let holder = current.locked_by.unwrap_or_else(|| "unknown".to_string());
        return Err(TransitionError::Locked { holder });
    }

    if checklist.is_empty() {
        return Err(ValidationError::EmptyChecklist.into());
    }
    let passed = checklist_satisfied(&checklist);
    if passed {
        if revision_deadline.is_some() {
            return Err(ValidationError::DeadlineWithoutReturn.into());
        }
    } else if let Some(deadline) = revision_deadline {
        // Deadline is measured against the verification time being written
        require_deadline_after(deadline, now)?;
    }

    let minted = next_verification_number(store, now).await?;

    let mut updated = current.clone();
    updated.verification = Some(VerificationRecord {
        number: minted.formatted.clone(),
        time: now,
        verifier_name: actor.display_name.clone(),
        checklist,
    });
    updated.locked_by = None;
    updated.locked_at = None;
    if passed {
        updated.status = DocumentStatus::Forwarded;
        updated.editable_by_owner = false;
        updated.revision_deadline = None;
    } else {
        updated.status = DocumentStatus::Returned;
        updated.editable_by_owner = true;
        updated.revision_deadline = revision_deadline;
    }

    let guard = UpdateGuard::status(DocumentStatus::AwaitingVerification).with_lock(
        LockCondition::AvailableTo {
            user_id: actor.user_id.clone(),
            now,
            timeout: lock_timeout,
        },
    );
    if !store
        .update_where(id, &guard, updated.clone(), &[minted.issued])
        .await?
    {
        return Err(stale_or_locked(store, id, DocumentStatus::AwaitingVerification, &actor.user_id).await);
    }

    info!(
        document_id = %id,
        verification_number = %minted.formatted,
        verifier = %actor.display_name,
        passed,
        "document verified"
    );
    let event = DomainEvent {
        document_id: id,
        new_status: updated.status,
        actor: actor.user_id.clone(),
    };
    let message = if passed {
        format!(
            "Document {} passed verification and was forwarded",
            updated.spm_number
        )
    } else {
        format!(
            "Document {} was returned after verification",
            updated.spm_number
        )
    };
    emit_transition(notifier, &event, &updated.submitting_user_id, &message).await;

    Ok(updated)
}

/// Return a document with corrections, skipping the verifier:
/// `AwaitingVerification -> Returned`.
///
/// The correction number embeds the registration suffix; its monthly
/// sequence is stored as a raw integer on the record.
pub async fn correct(
    store: &dyn DocumentStore,
    notifier: &dyn NotificationService,
    actor: &AuthContext,
    id: DocumentId,
    note: String,
    revision_deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Result<Document, TransitionError> {
    require_role(actor, Role::Corrector)?;
    let current = store.get(id).await?;
    require_status(&current, DocumentStatus::AwaitingVerification)?;
    if !current.lock_available_to(&actor.user_id, now, lock_timeout) {
        let holder = current.locked_by.unwrap_or_else(|| "unknown".to_string());
        return Err(TransitionError::Locked { holder });
    }

    require_field("correction note", &note)?;
    let Some(registration) = current.registration.clone() else {
        return Err(TransitionError::NotRegistered);
    };
    if let Some(deadline) = revision_deadline {
        require_deadline_after(deadline, now)?;
    }

    let minted = next_correction_number(store, &registration.number, now).await?;

    let mut updated = current.clone();
    updated.status = DocumentStatus::Returned;
    updated.correction = Some(CorrectionRecord {
        number: minted.formatted.clone(),
        sequence: minted.sequence,
        corrector_id: actor.user_id.clone(),
        time: now,
        note,
    });
    updated.editable_by_owner = true;
    updated.revision_deadline = revision_deadline;
    updated.locked_by = None;
    updated.locked_at = None;

    let guard = UpdateGuard::status(DocumentStatus::AwaitingVerification).with_lock(
        LockCondition::AvailableTo {
            user_id: actor.user_id.clone(),
            now,
            timeout: lock_timeout,
        },
    );
    if !store
        .update_where(id, &guard, updated.clone(), &[minted.issued])
        .await?
    {
        return Err(stale_or_locked(store, id, DocumentStatus::AwaitingVerification, &actor.user_id).await);
    }

    info!(
        document_id = %id,
        correction_number = %minted.formatted,
        corrector = %actor.user_id,
        "document returned with corrections"
    );
    let event = DomainEvent {
        document_id: id,
        new_status: updated.status,
        actor: actor.user_id.clone(),
    };
    let message = format!(
        "Document {} was returned with correction {}",
        updated.spm_number, minted.formatted
    );
    emit_transition(notifier, &event, &updated.submitting_user_id, &message).await;

    Ok(updated)
}

/// SP2D fields recorded when a forwarded document completes.
#[derive(Debug, Clone)]
pub struct DisbursementOptions {
    pub sp2d_number: String,
    pub sp2d_date: NaiveDate,
    pub sp2d_sequence: u32,
    pub bank_name: String,
    pub bank_submission_date: Option<NaiveDate>,
}

/// Record the SP2D and complete the document: `Forwarded -> Completed`.
///
/// `Completed` is terminal; nothing mutates the document afterwards.
pub async fn register_disbursement(
    store: &dyn DocumentStore,
    notifier: &dyn NotificationService,
    actor: &AuthContext,
    id: DocumentId,
    options: DisbursementOptions,
) -> Result<Document, TransitionError> {
    require_role(actor, Role::DisbursementRegistrar)?;
    let current = store.get(id).await?;
    require_status(&current, DocumentStatus::Forwarded)?;

    require_field("SP2D number", &options.sp2d_number)?;
    require_field("bank name", &options.bank_name)?;
    if options.sp2d_sequence == 0 {
        return Err(ValidationError::NonPositiveSp2dSequence.into());
    }

    let mut updated = current.clone();
    updated.status = DocumentStatus::Completed;
    updated.disbursement = Some(DisbursementRecord {
        sp2d_number: options.sp2d_number,
        sp2d_date: options.sp2d_date,
        sp2d_sequence: options.sp2d_sequence,
        bank_name: options.bank_name,
        bank_submission_date: options.bank_submission_date,
    });

    let guard = UpdateGuard::status(DocumentStatus::Forwarded);
    if !store.update_where(id, &guard, updated.clone(), &[]).await? {
        return Err(stale_or_locked(store, id, DocumentStatus::Forwarded, &actor.user_id).await);
    }

    info!(
        document_id = %id,
        sp2d_number = %updated.disbursement.as_ref().map_or("", |d| d.sp2d_number.as_str()),
        "disbursement registered, document completed"
    );
    let event = DomainEvent {
        document_id: id,
        new_status: updated.status,
        actor: actor.user_id.clone(),
    };
    let message = format!(
        "Document {} completed; SP2D recorded",
        updated.spm_number
    );
    emit_transition(notifier, &event, &updated.submitting_user_id, &message).await;

    Ok(updated)
}
