#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use common::{
    corrector, disbursement_registrar, owner, other_owner, reference, registrar, submit,
    submit_options, t0, verifier, RecordingNotifier,
};
use tagihan_engine::{
    correct, create_document, default_lock_timeout, delete_document, register,
    register_disbursement, resubmit, send_back_for_revision, update_document, verify,
    ChecklistItem, CreateDocumentError, DisbursementOptions, DocumentCrudError, DocumentStatus,
    InMemoryDocumentStore, TransitionError, UpdateDocumentOptions,
};

fn full_checklist() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::satisfied("signature present"),
        ChecklistItem::satisfied("amount matches attachment"),
        ChecklistItem::satisfied("budget line valid"),
    ]
}

#[tokio::test]
async fn test_scenario_a_full_pipeline() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();

    // Submitted with sequence 7 for Dinas X / A1 in 2025
    let doc = submit(&store, 7).await;
    assert_eq!(doc.status, DocumentStatus::AwaitingRegistration);
    assert_eq!(doc.spm_number, "LS|A1/1.02.01/M/0007/01/2025");

    // Registered: first registration of the month
    let doc = register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .expect("Should register");
    assert_eq!(doc.status, DocumentStatus::AwaitingVerification);
    let registration = doc.registration.clone().unwrap();
    assert_eq!(registration.number, "REG-20250115-0001");
    assert_eq!(registration.registrar_name, "Siti");

    // Verified with every criterion satisfied
    let doc = verify(
        &store,
        &notifier,
        &verifier("ver-1", "Budi"),
        doc.id,
        full_checklist(),
        None,
        t0() + Duration::hours(1),
        default_lock_timeout(),
    )
    .await
    .expect("Should verify");

    assert_eq!(doc.status, DocumentStatus::Forwarded);
    let verification = doc.verification.clone().unwrap();
    assert_eq!(verification.number, "VRF-20250115-0001");
    assert_eq!(verification.verifier_name, "Budi");
    assert!(doc.locked_by.is_none(), "lock must be cleared by verify");
    assert!(doc.locked_at.is_none());

    // Disbursement recorded
    let doc = register_disbursement(
        &store,
        &notifier,
        &disbursement_registrar(),
        doc.id,
        DisbursementOptions {
            sp2d_number: "SP2D-0001/2025".to_string(),
            sp2d_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            sp2d_sequence: 1,
            bank_name: "Bank Jatim".to_string(),
            bank_submission_date: None,
        },
    )
    .await
    .expect("Should complete");
    assert_eq!(doc.status, DocumentStatus::Completed);

    // Owner was notified at each step
    let deliveries = notifier.deliveries().await;
    assert_eq!(deliveries.len(), 3);
    assert!(deliveries.iter().all(|(user, _, _)| user == "owner-1"));
}

#[tokio::test]
async fn test_register_twice_is_stale() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;

    register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap();

    let err = register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransitionError::StaleState {
            expected: DocumentStatus::AwaitingRegistration,
            actual: DocumentStatus::AwaitingVerification,
        }
    ));
}

#[tokio::test]
async fn test_role_enforcement() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;

    // The owner cannot register their own document
    let err = register(&store, &notifier, &owner(), doc.id, t0())
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::RoleNotPermitted { .. }));

    // A registrar cannot submit documents
    let err = create_document(&store, &reference(), &registrar(), submit_options(2), t0())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateDocumentError::RoleNotPermitted { .. }));
}

#[tokio::test]
async fn test_send_back_and_resubmit() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;

    let doc = send_back_for_revision(
        &store,
        &notifier,
        &registrar(),
        doc.id,
        Some("attachment missing".to_string()),
    )
    .await
    .expect("Should send back");
    assert_eq!(doc.status, DocumentStatus::UnderReview);
    assert!(doc.registration.is_none());
    assert_eq!(doc.revision_note.as_deref(), Some("attachment missing"));

    // Owner may edit while under review
    let doc = update_document(
        &store,
        &reference(),
        &owner(),
        doc.id,
        UpdateDocumentOptions {
            description: Some("Pengadaan ATK (revisi)".to_string()),
            ..Default::default()
        },
        t0() + Duration::hours(2),
    )
    .await
    .expect("Should edit under review");
    assert_eq!(doc.description, "Pengadaan ATK (revisi)");

    let doc = resubmit(&store, &notifier, &owner(), doc.id, t0() + Duration::hours(3))
        .await
        .expect("Should resubmit");
    assert_eq!(doc.status, DocumentStatus::AwaitingVerification);
    assert!(doc.revision_note.is_none());
}

#[tokio::test]
async fn test_verify_fail_returns_document() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;
    register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap();

    let verification_time = t0() + Duration::hours(1);
    let deadline = verification_time + Duration::days(3);
    let checklist = vec![
        ChecklistItem::satisfied("signature present"),
        ChecklistItem::unsatisfied("amount matches attachment", "attachment shows 14.5jt"),
    ];

    let doc = verify(
        &store,
        &notifier,
        &verifier("ver-1", "Budi"),
        doc.id,
        checklist,
        Some(deadline),
        verification_time,
        default_lock_timeout(),
    )
    .await
    .expect("Should verify with failure outcome");

    assert_eq!(doc.status, DocumentStatus::Returned);
    assert!(doc.editable_by_owner);
    assert_eq!(doc.revision_deadline, Some(deadline));
    assert!(doc.verification.is_some());
    assert!(doc.locked_by.is_none());
}

#[tokio::test]
async fn test_verify_rejects_empty_checklist_and_bad_deadline() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;
    register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap();

    let err = verify(
        &store,
        &notifier,
        &verifier("ver-1", "Budi"),
        doc.id,
        Vec::new(),
        None,
        t0(),
        default_lock_timeout(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, TransitionError::Validation(_)));

    // Deadline at the verification time itself is not "strictly after"
    let checklist = vec![ChecklistItem::unsatisfied("signature present", "unsigned")];
    let err = verify(
        &store,
        &notifier,
        &verifier("ver-1", "Budi"),
        doc.id,
        checklist,
        Some(t0()),
        t0(),
        default_lock_timeout(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, TransitionError::Validation(_)));
}

#[tokio::test]
async fn test_correct_skips_verifier() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;
    register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap();

    let correction_time = t0() + Duration::hours(2);
    let doc = correct(
        &store,
        &notifier,
        &corrector(),
        doc.id,
        "kode rekening salah".to_string(),
        Some(correction_time + Duration::days(3)),
        correction_time,
        default_lock_timeout(),
    )
    .await
    .expect("Should correct");

    assert_eq!(doc.status, DocumentStatus::Returned);
    let correction = doc.correction.clone().unwrap();
    // Registration REG-20250115-0001 -> base suffix 1, first correction of the month
    assert_eq!(correction.number, "1-K-0001");
    assert_eq!(correction.sequence, 1);
    assert_eq!(correction.corrector_id, "cor-1");
    assert!(doc.verification.is_none(), "correction skips the verifier");
    assert!(doc.editable_by_owner);
}

#[tokio::test]
async fn test_scenario_c_revision_deadline() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();

    // Two identical pipelines, different sequence numbers
    let doc_a = submit(&store, 1).await;
    let doc_b = submit(&store, 2).await;
    for id in [doc_a.id, doc_b.id] {
        register(&store, &notifier, &registrar(), id, t0())
            .await
            .unwrap();
    }

    let verification_time = t0() + Duration::hours(1);
    let deadline = verification_time + Duration::days(3);
    let failing = vec![ChecklistItem::unsatisfied("signature present", "unsigned")];
    for id in [doc_a.id, doc_b.id] {
        verify(
            &store,
            &notifier,
            &verifier("ver-1", "Budi"),
            id,
            failing.clone(),
            Some(deadline),
            verification_time,
            default_lock_timeout(),
        )
        .await
        .unwrap();
    }

    // Edit and resubmit two days in: allowed
    let two_days_in = verification_time + Duration::days(2);
    update_document(
        &store,
        &reference(),
        &owner(),
        doc_a.id,
        UpdateDocumentOptions {
            gross_amount: Some(Decimal::new(14_500_000, 0)),
            ..Default::default()
        },
        two_days_in,
    )
    .await
    .expect("Should edit before the deadline");
    let doc_a = resubmit(&store, &notifier, &owner(), doc_a.id, two_days_in)
        .await
        .expect("Should resubmit before the deadline");
    assert_eq!(doc_a.status, DocumentStatus::AwaitingVerification);
    assert!(doc_a.verification.is_none());
    assert!(doc_a.revision_deadline.is_none());

    // Four days in the window has closed
    let four_days_in = verification_time + Duration::days(4);
    let err = update_document(
        &store,
        &reference(),
        &owner(),
        doc_b.id,
        UpdateDocumentOptions {
            description: Some("terlambat".to_string()),
            ..Default::default()
        },
        four_days_in,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DocumentCrudError::RevisionWindowClosed { .. }
    ));

    let err = resubmit(&store, &notifier, &owner(), doc_b.id, four_days_in)
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::RevisionWindowClosed { .. }));
}

#[tokio::test]
async fn test_resubmit_requires_owner() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;
    send_back_for_revision(&store, &notifier, &registrar(), doc.id, None)
        .await
        .unwrap();

    let err = resubmit(&store, &notifier, &other_owner(), doc.id, t0())
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::NotOwner));
}

#[tokio::test]
async fn test_terminal_immutability() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();
    let doc = submit(&store, 1).await;
    register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap();
    verify(
        &store,
        &notifier,
        &verifier("ver-1", "Budi"),
        doc.id,
        full_checklist(),
        None,
        t0(),
        default_lock_timeout(),
    )
    .await
    .unwrap();
    register_disbursement(
        &store,
        &notifier,
        &disbursement_registrar(),
        doc.id,
        DisbursementOptions {
            sp2d_number: "SP2D-0001/2025".to_string(),
            sp2d_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            sp2d_sequence: 1,
            bank_name: "Bank Jatim".to_string(),
            bank_submission_date: None,
        },
    )
    .await
    .unwrap();

    // Completed documents reject every mutation path
    let err = update_document(
        &store,
        &reference(),
        &owner(),
        doc.id,
        UpdateDocumentOptions {
            description: Some("should not apply".to_string()),
            ..Default::default()
        },
        t0() + Duration::days(1),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DocumentCrudError::NotEditable(DocumentStatus::Completed)
    ));

    let err = delete_document(&store, &owner(), doc.id).await.unwrap_err();
    assert!(matches!(
        err,
        DocumentCrudError::NotDeletable(DocumentStatus::Completed)
    ));

    let err = register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::StaleState { .. }));

    let err = register_disbursement(
        &store,
        &notifier,
        &disbursement_registrar(),
        doc.id,
        DisbursementOptions {
            sp2d_number: "SP2D-0002/2025".to_string(),
            sp2d_date: NaiveDate::from_ymd_opt(2025, 1, 21).unwrap(),
            sp2d_sequence: 2,
            bank_name: "Bank Jatim".to_string(),
            bank_submission_date: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, TransitionError::StaleState { .. }));
}

#[tokio::test]
async fn test_delete_only_while_awaiting_registration() {
    let store = InMemoryDocumentStore::new();
    let notifier = RecordingNotifier::new();

    let doc = submit(&store, 1).await;
    delete_document(&store, &owner(), doc.id)
        .await
        .expect("Should delete before registration");

    let doc = submit(&store, 2).await;
    register(&store, &notifier, &registrar(), doc.id, t0())
        .await
        .unwrap();
    let err = delete_document(&store, &owner(), doc.id).await.unwrap_err();
    assert!(matches!(
        err,
        DocumentCrudError::NotDeletable(DocumentStatus::AwaitingVerification)
    ));
}
