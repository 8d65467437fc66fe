//! Persistence seam for the lifecycle engine.
//!
//! All coordination between concurrent request handlers goes through the
//! store's conditional updates; the engine itself keeps no shared mutable
//! state. A driver must evaluate the [`UpdateGuard`] and apply the write as
//! one atomic step (`UPDATE ... WHERE ...` in SQL terms). The in-memory
//! driver in [`memory`] does this under a single mutex and is the reference
//! for the contract.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::document::{Document, DocumentId, DocumentStatus};

pub use memory::InMemoryDocumentStore;

/// Error type for store operations
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Document {0} not found")]
    NotFound(DocumentId),

    #[error(
        "SPM number already exists for sequence {sequence}, unit '{unit}', schedule '{schedule}' in {year}"
    )]
    DuplicateSpm {
        sequence: u32,
        unit: String,
        schedule: String,
        year: i32,
    },

    /// Connectivity failure. Fatal for the in-flight request; never retried
    /// by the engine.
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Lock clause of an [`UpdateGuard`], mirroring the SQL `WHERE` shapes the
/// lock manager needs.
#[derive(Debug, Clone, Default)]
pub enum LockCondition {
    /// No constraint on the lock fields
    #[default]
    Any,
    /// `locked_by IS NULL`
    Free,
    /// `locked_by = user`
    HeldBy(String),
    /// `locked_by IS NULL OR locked_by = user OR locked_at < now - timeout`
    AvailableTo {
        user_id: String,
        now: DateTime<Utc>,
        timeout: Duration,
    },
}

impl LockCondition {
    /// Evaluate this condition against a document's current lock fields.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            LockCondition::Any => true,
            LockCondition::Free => document.locked_by.is_none(),
            LockCondition::HeldBy(user_id) => {
                document.locked_by.as_deref() == Some(user_id.as_str())
            }
            LockCondition::AvailableTo {
                user_id,
                now,
                timeout,
            } => document.lock_available_to(user_id, *now, *timeout),
        }
    }
}

/// Compare-and-swap guard for conditional updates and deletes.
///
/// A guarded write applies only when every clause matches the row as stored
/// at write time; a non-match affects zero rows and the caller decides what
/// to do. The store never retries on the caller's behalf.
#[derive(Debug, Clone, Default)]
pub struct UpdateGuard {
    pub expected_status: Option<DocumentStatus>,
    pub lock: LockCondition,
}

impl UpdateGuard {
    /// Guard on the expected pre-transition status only
    #[must_use]
    pub fn status(expected: DocumentStatus) -> Self {
        Self {
            expected_status: Some(expected),
            lock: LockCondition::Any,
        }
    }

    /// Add a lock clause to this guard
    #[must_use]
    pub fn with_lock(mut self, lock: LockCondition) -> Self {
        self.lock = lock;
        self
    }

    /// Evaluate the full guard against a document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(expected) = self.expected_status {
            if document.status != expected {
                return false;
            }
        }
        self.lock.matches(document)
    }
}

/// Counter families tracked in the issued-number ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    Registration,
    Verification,
    Correction,
}

impl CounterKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Registration => "registration",
            CounterKind::Verification => "verification",
            CounterKind::Correction => "correction",
        }
    }
}

/// A counter value minted inside a transition, recorded atomically with it.
///
/// The ledger is what makes issued numbers durable: clearing a metadata
/// record off a document can never cause a number to be issued twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedNumber {
    pub counter: CounterKind,
    pub window: String,
    pub value: u32,
}

/// Document persistence contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Enforces the SPM uniqueness constraint over
    /// (`sequence_number`, `owning_unit_name`, `schedule_code`, year suffix
    /// of `spm_number`) and fails with [`StoreError::DuplicateSpm`] on
    /// collision.
    async fn insert(&self, document: Document) -> Result<(), StoreError>;

    /// Fetch a document by id.
    async fn get(&self, id: DocumentId) -> Result<Document, StoreError>;

    /// All documents, ordered by submission time.
    async fn list(&self) -> Result<Vec<Document>, StoreError>;

    /// Conditionally replace a document.
    ///
    /// Returns `Ok(true)` when the guard matched and the write (plus the
    /// ledger entries in `issued`) was applied atomically; `Ok(false)` when
    /// the guard matched zero rows and nothing changed. The SPM uniqueness
    /// constraint is enforced against all other documents.
    async fn update_where(
        &self,
        id: DocumentId,
        guard: &UpdateGuard,
        document: Document,
        issued: &[IssuedNumber],
    ) -> Result<bool, StoreError>;

    /// Conditionally hard-delete a document. Returns `Ok(false)` when the
    /// guard matched zero rows.
    async fn delete_where(&self, id: DocumentId, guard: &UpdateGuard) -> Result<bool, StoreError>;

    /// Highest value recorded in the issued-number ledger for a counter
    /// window, or `None` if the window has no issuances yet.
    async fn max_issued(
        &self,
        counter: CounterKind,
        window: &str,
    ) -> Result<Option<u32>, StoreError>;
}
