//! Common test utilities

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

use tagihan_engine::{
    create_document, AuthContext, CreateDocumentOptions, Document, DocumentId, DocumentType,
    InMemoryDocumentStore, NotificationError, NotificationService, Role, StaticReferenceData,
};

/// Reference clock for deterministic scenarios: 2025-01-15 09:00 UTC
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
}

/// Reference data with known units and schedules
#[allow(dead_code)]
pub fn reference() -> StaticReferenceData {
    StaticReferenceData::new()
        .with_unit("Dinas X", "1.02.01", "M")
        .with_schedule("A1", "Jadwal reguler")
        .with_schedule("B2", "Jadwal tambahan")
}

#[allow(dead_code)]
pub fn owner() -> AuthContext {
    AuthContext::new("owner-1", "Bendahara Dinas X", Role::Skpd)
}

#[allow(dead_code)]
pub fn other_owner() -> AuthContext {
    AuthContext::new("owner-2", "Bendahara Dinas Y", Role::Skpd)
}

pub fn registrar() -> AuthContext {
    AuthContext::new("reg-1", "Siti", Role::Registrar)
}

#[allow(dead_code)]
pub fn verifier(user_id: &str, display_name: &str) -> AuthContext {
    AuthContext::new(user_id, display_name, Role::Verifier)
}

#[allow(dead_code)]
pub fn corrector() -> AuthContext {
    AuthContext::new("cor-1", "Rina", Role::Corrector)
}

#[allow(dead_code)]
pub fn disbursement_registrar() -> AuthContext {
    AuthContext::new("sp2d-1", "Agus", Role::DisbursementRegistrar)
}

/// Default submission options for unit "Dinas X", schedule "A1", year 2025
#[allow(dead_code)]
pub fn submit_options(sequence_number: u32) -> CreateDocumentOptions {
    CreateDocumentOptions {
        owning_unit_name: "Dinas X".to_string(),
        description: "Pengadaan alat tulis kantor".to_string(),
        gross_amount: Decimal::new(15_000_000, 0),
        document_type: DocumentType::Ls,
        claim_type: "barang".to_string(),
        funding_source: "APBD".to_string(),
        sequence_number,
        schedule_code: "A1".to_string(),
        document_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
    }
}

/// Submit a document and return it
pub async fn submit(store: &InMemoryDocumentStore, sequence_number: u32) -> Document {
    create_document(
        store,
        &reference(),
        &owner(),
        submit_options(sequence_number),
        t0(),
    )
    .await
    .expect("Should create document")
}

/// Notifier that records every delivery for assertions
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<(String, String, DocumentId)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub async fn deliveries(&self) -> Vec<(String, String, DocumentId)> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn notify(
        &self,
        user_id: &str,
        message: &str,
        related_document_id: DocumentId,
    ) -> Result<(), NotificationError> {
        self.deliveries
            .lock()
            .await
            .push((user_id.to_string(), message.to_string(), related_document_id));
        Ok(())
    }
}
