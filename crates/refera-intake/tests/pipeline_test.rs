use std::sync::Arc;

use refera_intake::pipeline::{IntakeService, UploadRequest, PDF_MIME_TYPE};
use refera_intake::test_helpers::{
    MockIdentity, MockNotifier, MockReferralStore, MockStorage, RecordingProgress,
};
use refera_intake::{Compensation, Stage};

fn pdf_request() -> UploadRequest {
    UploadRequest {
        data: b"%PDF-1.4 test referral".to_vec(),
        file_name: "referral.pdf".to_string(),
        content_type: PDF_MIME_TYPE.to_string(),
        client_id: None,
        clients_page: false,
    }
}

fn service(
    storage: Arc<MockStorage>,
    store: Arc<MockReferralStore>,
    notifier: Arc<MockNotifier>,
) -> IntakeService {
    IntakeService::new(storage, store, notifier)
}

#[tokio::test]
async fn test_successful_upload() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store.clone(), notifier.clone());
    let progress = RecordingProgress::new();

    let receipt = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &progress)
        .await
        .unwrap();

    assert!(!receipt.storage_key.is_empty());
    assert!(storage.has_object(&receipt.storage_key));
    assert_eq!(storage.delete_keys().len(), 0);

    let created = store.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, receipt.referral_id);
    assert_eq!(created[0].file_path, receipt.storage_key);
    assert_eq!(created[0].file_name, "referral.pdf");
    assert_eq!(created[0].mime_type, PDF_MIME_TYPE);
    assert_eq!(created[0].file_size, b"%PDF-1.4 test referral".len() as i64);
    assert_eq!(store.marked_failed().len(), 0);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id, receipt.referral_id);
    assert_eq!(sent[0].client_id, None);

    assert_eq!(progress.last(), Some(100));
}

#[tokio::test]
async fn test_key_is_owner_scoped_pdf() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store, notifier);

    let receipt = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap();

    let key = receipt.storage_key;
    let (owner, rest) = key.split_once('/').unwrap();
    assert_eq!(owner, "u1");
    assert!(rest.ends_with(".pdf"));

    let stem = rest.strip_suffix(".pdf").unwrap();
    let (millis, token) = stem.split_once('-').unwrap();
    assert!(millis.chars().all(|c| c.is_ascii_digit()));
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_non_pdf_rejected_before_any_remote_call() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store.clone(), notifier.clone());

    let mut request = pdf_request();
    request.content_type = "image/png".to_string();

    let failure = service
        .upload(request, &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Validation);
    assert_eq!(failure.compensation, Compensation::None);
    assert_eq!(storage.upload_keys().len(), 0);
    assert_eq!(store.created().len(), 0);
    assert_eq!(notifier.sent().len(), 0);
}

#[tokio::test]
async fn test_unauthenticated_upload_has_no_side_effects() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store.clone(), notifier.clone());

    let failure = service
        .upload(pdf_request(), &MockIdentity::anonymous(), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Authentication);
    assert_eq!(storage.upload_keys().len(), 0);
    assert_eq!(store.created().len(), 0);
    assert_eq!(notifier.sent().len(), 0);
}

#[tokio::test]
async fn test_storage_failure_inserts_nothing() {
    let storage = Arc::new(MockStorage::failing_upload());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store.clone(), notifier.clone());

    let failure = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Storage);
    assert_eq!(failure.compensation, Compensation::None);
    assert_eq!(store.created().len(), 0);
    assert_eq!(notifier.sent().len(), 0);
    assert_eq!(storage.delete_keys().len(), 0);
}

#[tokio::test]
async fn test_insert_failure_deletes_the_object_exactly_once() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::failing_create());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store.clone(), notifier.clone());

    let failure = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Persistence);
    assert_eq!(failure.compensation, Compensation::ObjectDeleted);

    let uploaded = storage.upload_keys();
    let deleted = storage.delete_keys();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0], uploaded[0]);
    assert!(!storage.has_object(&uploaded[0]));
    assert_eq!(notifier.sent().len(), 0);
}

#[tokio::test]
async fn test_insert_failure_with_failing_delete_keeps_persistence_error() {
    let storage = Arc::new(MockStorage::failing_delete());
    let store = Arc::new(MockReferralStore::failing_create());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store, notifier);

    let failure = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Persistence);
    assert_eq!(failure.compensation, Compensation::ObjectDeleteFailed);
    assert_eq!(storage.delete_keys().len(), 1);
}

#[tokio::test]
async fn test_webhook_failure_marks_record_and_keeps_object() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::failing());
    let service = service(storage.clone(), store.clone(), notifier);

    let failure = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Notification);
    assert_eq!(failure.compensation, Compensation::RecordMarkedFailed);

    // The record and the object both survive a webhook failure.
    let created = store.created();
    assert_eq!(created.len(), 1);
    assert_eq!(store.marked_failed(), vec![created[0].id]);
    assert_eq!(storage.delete_keys().len(), 0);
    assert!(storage.has_object(&created[0].file_path));
}

#[tokio::test]
async fn test_webhook_failure_with_failing_mark() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::failing_mark());
    let notifier = Arc::new(MockNotifier::failing());
    let service = service(storage.clone(), store.clone(), notifier);

    let failure = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Notification);
    assert_eq!(failure.compensation, Compensation::None);
    assert_eq!(storage.delete_keys().len(), 0);
}

#[tokio::test]
async fn test_clients_page_notification_carries_sentinel() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage, store, notifier.clone());

    let mut request = pdf_request();
    request.client_id = Some("c42".to_string());
    request.clients_page = true;

    service
        .upload(request, &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].client_id.as_deref(), Some("-1"));
}

#[tokio::test]
async fn test_client_id_passed_through_to_notification() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage, store, notifier.clone());

    let mut request = pdf_request();
    request.client_id = Some("c42".to_string());

    service
        .upload(request, &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap();

    assert_eq!(notifier.sent()[0].client_id.as_deref(), Some("c42"));
}

#[tokio::test]
async fn test_progress_forwarded_from_storage_and_finishes_at_100() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage, store, notifier);
    let progress = RecordingProgress::new();

    service
        .upload(pdf_request(), &MockIdentity::user("u1"), &progress)
        .await
        .unwrap();

    let values = progress.values();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(values.last(), Some(&100));
}

#[tokio::test]
async fn test_two_uploads_by_same_user_get_distinct_keys() {
    let storage = Arc::new(MockStorage::new());
    let store = Arc::new(MockReferralStore::new());
    let notifier = Arc::new(MockNotifier::new());
    let service = service(storage.clone(), store, notifier);

    let first = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap();
    let second = service
        .upload(pdf_request(), &MockIdentity::user("u1"), &RecordingProgress::new())
        .await
        .unwrap();

    assert_ne!(first.storage_key, second.storage_key);
    assert!(storage.has_object(&first.storage_key));
    assert!(storage.has_object(&second.storage_key));
}
