//! Read-side document access with optional filtering.

use crate::store::DocumentStore;

use super::status::DocumentStatus;
use super::types::{Document, DocumentId};
use super::update::DocumentCrudError;

/// Filter criteria for document listings. Every field is optional and the
/// criteria compose with AND.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub owning_unit: Option<String>,
    pub claim_type: Option<String>,
    pub funding_source: Option<String>,
    pub schedule_code: Option<String>,
}

impl DocumentFilter {
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        let status_match = self.status.is_none_or(|s| document.status == s);
        let unit_match = self
            .owning_unit
            .as_deref()
            .is_none_or(|u| document.owning_unit_name == u);
        let claim_match = self
            .claim_type
            .as_deref()
            .is_none_or(|c| document.claim_type == c);
        let funding_match = self
            .funding_source
            .as_deref()
            .is_none_or(|f| document.funding_source == f);
        let schedule_match = self
            .schedule_code
            .as_deref()
            .is_none_or(|s| document.schedule_code == s);

        status_match && unit_match && claim_match && funding_match && schedule_match
    }
}

/// Fetch a single document by id.
pub async fn get_document(
    store: &dyn DocumentStore,
    id: DocumentId,
) -> Result<Document, DocumentCrudError> {
    Ok(store.get(id).await?)
}

/// List documents matching the filter, ordered by submission time.
pub async fn list_documents(
    store: &dyn DocumentStore,
    filter: &DocumentFilter,
) -> Result<Vec<Document>, DocumentCrudError> {
    let mut documents = store.list().await?;
    documents.retain(|d| filter.matches(d));
    Ok(documents)
}
