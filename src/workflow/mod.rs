pub mod events;
pub mod transitions;

pub use events::{
    emit_transition, DomainEvent, NoopNotifier, NotificationError, NotificationService,
};
pub use transitions::{
    correct, register, register_disbursement, resubmit, send_back_for_revision, verify,
    DisbursementOptions, TransitionError,
};
