//! Transition side effects: domain events and best-effort notification.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::document::{DocumentId, DocumentStatus};

/// Error type for notification delivery
#[derive(Error, Debug, Clone)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Emitted once per successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub document_id: DocumentId,
    pub new_status: DocumentStatus,
    /// User id of whoever drove the transition
    pub actor: String,
}

/// Notification delivery contract. Transport (push, email, change feed) is
/// the collaborator's concern.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify(
        &self,
        user_id: &str,
        message: &str,
        related_document_id: DocumentId,
    ) -> Result<(), NotificationError>;
}

/// Notifier that drops everything, for embedders without a transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationService for NoopNotifier {
    async fn notify(
        &self,
        _user_id: &str,
        _message: &str,
        _related_document_id: DocumentId,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Deliver a transition event to the recipient, fire-and-forget.
///
/// Delivery failure must never roll back the state transition that already
/// committed, so it is logged and swallowed here.
pub async fn emit_transition(
    notifier: &dyn NotificationService,
    event: &DomainEvent,
    recipient: &str,
    message: &str,
) {
    if let Err(err) = notifier
        .notify(recipient, message, event.document_id)
        .await
    {
        warn!(
            document_id = %event.document_id,
            new_status = %event.new_status,
            recipient = %recipient,
            error = %err,
            "notification delivery failed; transition already committed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingNotifier;

    #[async_trait]
    impl NotificationService for FailingNotifier {
        async fn notify(
            &self,
            _user_id: &str,
            _message: &str,
            _related_document_id: DocumentId,
        ) -> Result<(), NotificationError> {
            Err(NotificationError::Delivery("transport down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_emit_swallows_delivery_failure() {
        let event = DomainEvent {
            document_id: DocumentId::new(),
            new_status: DocumentStatus::AwaitingVerification,
            actor: "registrar-1".to_string(),
        };
        // Must not propagate the error
        emit_transition(&FailingNotifier, &event, "owner-1", "registered").await;
        emit_transition(&NoopNotifier, &event, "owner-1", "registered").await;
    }
}
