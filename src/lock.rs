//! Pessimistic per-document locking for the verification pool.
//!
//! No lock server: the lock is two columns on the document, taken and
//! released with conditional updates. A holder that walks away is covered by
//! the stale-lock window, evaluated lazily at the next acquisition attempt —
//! there is no background sweeper.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthContext;
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::store::{DocumentStore, LockCondition, StoreError, UpdateGuard};

/// Fallback window after which an abandoned lock may be reclaimed.
pub const LOCK_TIMEOUT_MINUTES: i64 = 30;

/// The default stale-lock window as a duration.
#[must_use]
pub fn default_lock_timeout() -> Duration {
    Duration::minutes(LOCK_TIMEOUT_MINUTES)
}

/// Error type for lock operations
#[derive(Error, Debug, Clone)]
pub enum LockError {
    #[error("Document {0} not found")]
    NotFound(DocumentId),

    #[error("This document is being processed by another reviewer ({holder})")]
    AlreadyLocked { holder: String },

    #[error("Only the lock holder may release this document (held by {holder})")]
    NotHolder { holder: String },

    #[error("Document is not awaiting verification (current status: {0})")]
    NotLockable(DocumentStatus),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LockError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => LockError::NotFound(id),
            other => LockError::Store(other),
        }
    }
}

/// Take the lock for `actor`.
///
/// One conditional update: `SET locked_by, locked_at WHERE status =
/// awaiting-verification AND (lock free OR held by actor OR stale)`. Zero
/// rows means someone else holds a live lock; the caller must not open the
/// edit surface.
pub async fn acquire_lock(
    store: &dyn DocumentStore,
    actor: &AuthContext,
    id: DocumentId,
    now: DateTime<Utc>,
    timeout: Duration,
) -> Result<Document, LockError> {
    let current = store.get(id).await?;
    if current.status != DocumentStatus::AwaitingVerification {
        return Err(LockError::NotLockable(current.status));
    }

    let mut updated = current.clone();
    updated.locked_by = Some(actor.user_id.clone());
    updated.locked_at = Some(now);

    let guard = UpdateGuard::status(DocumentStatus::AwaitingVerification).with_lock(
        LockCondition::AvailableTo {
            user_id: actor.user_id.clone(),
            now,
            timeout,
        },
    );

    if store.update_where(id, &guard, updated.clone(), &[]).await? {
        debug!(document_id = %id, user_id = %actor.user_id, "lock acquired");
        return Ok(updated);
    }

    // Zero rows: refetch to name the holder in the error.
    let holder = store
        .get(id)
        .await?
        .locked_by
        .unwrap_or_else(|| "unknown".to_string());
    Err(LockError::AlreadyLocked { holder })
}

/// Release the lock held by `actor`.
///
/// This is the normal abandon path (including cancel); the stale-lock window
/// is only a fallback. Releasing a lock that is already free is a no-op so
/// that cancel paths stay idempotent.
pub async fn release_lock(
    store: &dyn DocumentStore,
    actor: &AuthContext,
    id: DocumentId,
) -> Result<(), LockError> {
    let current = store.get(id).await?;

    let mut updated = current.clone();
    updated.locked_by = None;
    updated.locked_at = None;

    let guard = UpdateGuard::default().with_lock(LockCondition::HeldBy(actor.user_id.clone()));

    if store.update_where(id, &guard, updated, &[]).await? {
        debug!(document_id = %id, user_id = %actor.user_id, "lock released");
        return Ok(());
    }

    match store.get(id).await?.locked_by {
        None => Ok(()),
        Some(holder) => Err(LockError::NotHolder { holder }),
    }
}
