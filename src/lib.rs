//! Document lifecycle engine for regional government billing pipelines.
//!
//! Tracks billing documents (tagihan) from submission by a spending unit
//! through registration, verification, correction, and final SP2D
//! disbursement. The engine owns three things and nothing else:
//!
//! - the workflow state machine, where every transition is a single guarded
//!   store update;
//! - the sequential numbering subsystem (monthly counters plus the composite
//!   SPM number) with a duplicate guard backed by a persisted uniqueness
//!   constraint;
//! - the pessimistic locking protocol that serializes verification work via
//!   compare-and-swap updates with a lazy 30-minute stale window.
//!
//! Rendering, exports, notification transport, and authentication live
//! outside; they reach the engine through the trait contracts in
//! [`store`], [`reference`], and [`workflow::events`].

// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

pub mod auth;
pub mod config;
pub mod document;
pub mod lock;
pub mod logging;
pub mod numbering;
pub mod queue;
pub mod reference;
pub mod store;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use auth::{AuthContext, Role};
pub use config::EngineConfig;
pub use document::{
    checklist_satisfied, create_document, delete_document, get_document, list_documents,
    update_document, ChecklistItem, CorrectionRecord, CreateDocumentError, CreateDocumentOptions,
    DisbursementRecord, Document, DocumentCrudError, DocumentFilter, DocumentId, DocumentStatus,
    DocumentType, RegistrationRecord, UpdateDocumentOptions, ValidationError, VerificationRecord,
};
pub use lock::{acquire_lock, default_lock_timeout, release_lock, LockError, LOCK_TIMEOUT_MINUTES};
pub use numbering::{
    compose_spm_number, ensure_unique_spm, next_correction_number, next_registration_number,
    next_verification_number, DuplicateSequenceError, NumberingError, SpmNumber,
};
pub use queue::{
    correction_queue, corrector_history, disbursement_queue, owner_worklist, registrar_queue,
    verification_queue, verifier_history,
};
pub use reference::{
    MissingReferenceDataError, ReferenceDataError, ReferenceDataService, Schedule,
    StaticReferenceData, UnitInfo,
};
pub use store::{
    CounterKind, DocumentStore, InMemoryDocumentStore, IssuedNumber, LockCondition, StoreError,
    UpdateGuard,
};
pub use workflow::{
    correct, register, register_disbursement, resubmit, send_back_for_revision, verify,
    DisbursementOptions, DomainEvent, NoopNotifier, NotificationError, NotificationService,
    TransitionError,
};
