//! In-memory reference driver for [`DocumentStore`].
//!
//! Guard evaluation and the write happen under one mutex, which is exactly
//! the atomicity a SQL driver gets from a conditional `UPDATE`. Used by the
//! test suite and by embedders that do not need durability.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::document::{Document, DocumentId};
use crate::numbering::spm::year_suffix;

use super::{CounterKind, DocumentStore, IssuedNumber, StoreError, UpdateGuard};

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<DocumentId, Document>,
    /// (counter, window) -> highest issued value
    ledger: HashMap<(CounterKind, String), u32>,
}

/// Mutex-backed document store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents (test helper)
    pub async fn len(&self) -> usize {
        self.inner.lock().await.documents.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.documents.is_empty()
    }
}

/// Whether `candidate` collides with `existing` on the persisted uniqueness
/// scope: same sequence, unit, schedule, and SPM-number year suffix.
fn spm_scope_collides(candidate: &Document, existing: &Document) -> bool {
    existing.id != candidate.id
        && existing.sequence_number == candidate.sequence_number
        && existing.owning_unit_name == candidate.owning_unit_name
        && existing.schedule_code == candidate.schedule_code
        && year_suffix(&existing.spm_number) == year_suffix(&candidate.spm_number)
}

fn check_constraint(inner: &Inner, candidate: &Document) -> Result<(), StoreError> {
    for existing in inner.documents.values() {
        if spm_scope_collides(candidate, existing) {
            return Err(StoreError::DuplicateSpm {
                sequence: candidate.sequence_number,
                unit: candidate.owning_unit_name.clone(),
                schedule: candidate.schedule_code.clone(),
                year: year_suffix(&candidate.spm_number).unwrap_or_default(),
            });
        }
    }
    Ok(())
}

fn record_issued(inner: &mut Inner, issued: &[IssuedNumber]) {
    for entry in issued {
        let key = (entry.counter, entry.window.clone());
        let current = inner.ledger.entry(key).or_insert(0);
        *current = (*current).max(entry.value);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: Document) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        check_constraint(&inner, &document)?;
        inner.documents.insert(document.id, document);
        Ok(())
    }

    async fn get(&self, id: DocumentId) -> Result<Document, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .documents
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.lock().await;
        let mut documents: Vec<Document> = inner.documents.values().cloned().collect();
        documents.sort_by_key(|d| d.submission_time);
        Ok(documents)
    }

    async fn update_where(
        &self,
        id: DocumentId,
        guard: &UpdateGuard,
        document: Document,
        issued: &[IssuedNumber],
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(current) = inner.documents.get(&id) else {
            return Err(StoreError::NotFound(id));
        };
        if !guard.matches(current) {
            return Ok(false);
        }
        check_constraint(&inner, &document)?;
        record_issued(&mut inner, issued);
        inner.documents.insert(id, document);
        Ok(true)
    }

    async fn delete_where(&self, id: DocumentId, guard: &UpdateGuard) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(current) = inner.documents.get(&id) else {
            return Err(StoreError::NotFound(id));
        };
        if !guard.matches(current) {
            return Ok(false);
        }
        inner.documents.remove(&id);
        Ok(true)
    }

    async fn max_issued(
        &self,
        counter: CounterKind,
        window: &str,
    ) -> Result<Option<u32>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.ledger.get(&(counter, window.to_string())).copied())
    }
}
