pub mod create;
pub mod query;
pub mod status;
pub mod types;
pub mod update;
pub mod validation;

pub use create::{create_document, CreateDocumentError, CreateDocumentOptions};
pub use query::{get_document, list_documents, DocumentFilter};
pub use status::{DocumentStatus, StatusParseError};
pub use types::{
    checklist_satisfied, ChecklistItem, CorrectionRecord, DisbursementRecord, Document, DocumentId,
    DocumentType, RegistrationRecord, VerificationRecord,
};
pub use update::{
    delete_document, update_document, DocumentCrudError, UpdateDocumentOptions,
};
pub use validation::ValidationError;
