//! End-to-end tests for the file client and sync controller against a
//! mock backend and a scripted identity provider.

use std::io::Write;
use std::sync::Arc;

use vault_api_client::{FileClient, StagedUpload, SyncController};
use vault_auth::testing::MockProvider;
use vault_auth::SessionManager;
use vault_core::{FileKind, VaultConfig, VaultError};

const LISTING_BODY: &str = r#"[
  {"id":"10","name":"q3-report.pdf","size":"3.4 MB","type":"pdf","upload_date":"2024-10-01"},
  {"id":"11","name":"team.jpg","size":"0.8 MB","type":"image","upload_date":"2024-10-02"},
  {"id":"12","name":"notes.txt","size":"2 KB","type":"other","upload_date":"2024-10-03"}
]"#;

fn config_for(base_url: &str) -> VaultConfig {
    VaultConfig {
        api_base_url: base_url.to_string(),
        ..VaultConfig::default()
    }
}

/// Session manager with a scripted provider, already settled.
async fn settled_session() -> (SessionManager, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new());
    let manager = SessionManager::start(provider.clone());
    manager.wait_settled().await;
    (manager, provider)
}

async fn signed_in_session() -> (SessionManager, Arc<MockProvider>) {
    let (manager, provider) = settled_session().await;
    manager
        .login("user@example.com", "secret")
        .await
        .expect("scripted login");
    (manager, provider)
}

#[tokio::test]
async fn list_files_requires_authentication() {
    let mut server = mockito::Server::new_async().await;
    let never_hit = server
        .mock("GET", "/api/files")
        .expect(0)
        .create_async()
        .await;

    let (manager, _provider) = settled_session().await;
    let client = FileClient::new(manager, &config_for(&server.url())).unwrap();

    let err = client.list_files().await.unwrap_err();
    // No fallback here: the fallback is only for backend-communication
    // failures after authentication.
    assert!(matches!(err, VaultError::NotAuthenticated));
    never_hit.assert_async().await;
}

#[tokio::test]
async fn list_files_sends_a_fresh_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let listing = server
        .mock("GET", "/api/files")
        .match_header("authorization", "Bearer token-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING_BODY)
        .create_async()
        .await;

    let (manager, provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for(&server.url())).unwrap();

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].name, "q3-report.pdf");
    assert_eq!(files[0].kind, FileKind::Pdf);
    assert_eq!(files[2].kind, FileKind::Other);
    assert_eq!(provider.issue_token_calls(), 1);
    listing.assert_async().await;
}

#[tokio::test]
async fn list_files_backend_error_serves_the_fallback_listing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/files")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for(&server.url())).unwrap();

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].id, "1");
    assert_eq!(files[0].name, "sample-document.pdf");
    assert_eq!(files[0].size, "2.1 MB");
    assert_eq!(files[0].kind, FileKind::Pdf);
    assert_eq!(files[0].upload_date, "2024-09-28");
    assert_eq!(files[1].id, "2");
    assert_eq!(files[1].name, "example-image.jpg");
    assert_eq!(files[1].size, "1.5 MB");
    assert_eq!(files[1].kind, FileKind::Image);
    assert_eq!(files[1].upload_date, "2024-09-28");
}

#[tokio::test]
async fn list_files_timeout_serves_the_fallback_listing() {
    let mut server = mockito::Server::new_async().await;
    // Stall the response body well past the listing timeout.
    server
        .mock("GET", "/api/files")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|writer| {
            std::thread::sleep(std::time::Duration::from_secs(2));
            writer.write_all(LISTING_BODY.as_bytes())
        })
        .create_async()
        .await;

    let config = VaultConfig {
        api_base_url: server.url(),
        list_timeout_secs: 1,
        ..VaultConfig::default()
    };
    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config).unwrap();

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "sample-document.pdf");
    assert_eq!(files[1].name, "example-image.jpg");
}

#[tokio::test]
async fn list_files_unreachable_backend_serves_the_fallback_listing() {
    // Nothing listens on this port.
    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for("http://127.0.0.1:1")).unwrap();

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "sample-document.pdf");
    assert_eq!(files[1].name, "example-image.jpg");
}

#[tokio::test]
async fn upload_failure_surfaces_and_retains_the_staged_file() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/upload")
        .with_status(500)
        .with_body("disk full")
        .create_async()
        .await;

    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for(&server.url())).unwrap();
    let mut controller = SyncController::new(client);

    controller
        .stage(StagedUpload::new("notes.txt", b"hello".to_vec()))
        .unwrap();
    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, VaultError::Backend { status: 500, .. }));
    // Retained for retry.
    assert_eq!(controller.staged().unwrap().name, "notes.txt");
    assert!(controller.notice().is_none());
}

#[tokio::test]
async fn upload_transport_failure_propagates_a_network_error() {
    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for("http://127.0.0.1:1")).unwrap();
    let mut controller = SyncController::new(client);

    controller
        .stage(StagedUpload::new("notes.txt", b"hello".to_vec()))
        .unwrap();
    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, VaultError::Network(_)));
    assert!(controller.staged().is_some());
}

#[tokio::test]
async fn successful_upload_clears_staging_refreshes_and_notices() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/api/upload")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"42","name":"notes.txt"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", "/api/files")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING_BODY)
        .expect(1)
        .create_async()
        .await;

    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for(&server.url())).unwrap();
    let mut controller = SyncController::new(client);

    controller
        .stage(StagedUpload::new("notes.txt", b"hello".to_vec()))
        .unwrap();
    let receipt = controller.submit().await.unwrap();

    assert_eq!(receipt.id.as_deref(), Some("42"));
    assert!(controller.staged().is_none());
    // The refresh was issued automatically, after the upload resolved.
    assert_eq!(controller.files().len(), 3);
    assert_eq!(controller.notice(), Some("File uploaded successfully!"));
    upload.assert_async().await;
    refresh.assert_async().await;

    // The success notice auto-clears after three seconds.
    tokio::time::pause();
    tokio::time::advance(std::time::Duration::from_millis(3100)).await;
    assert!(controller.notice().is_none());
}

#[tokio::test]
async fn staging_replaces_the_previous_selection() {
    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for("http://127.0.0.1:1")).unwrap();
    let mut controller = SyncController::new(client);

    controller
        .stage(StagedUpload::new("first.txt", b"a".to_vec()))
        .unwrap();
    controller
        .stage(StagedUpload::new("second.txt", b"b".to_vec()))
        .unwrap();
    assert_eq!(controller.staged().unwrap().name, "second.txt");
    assert!(controller.can_submit());

    controller.clear_staged();
    assert!(!controller.can_submit());
}

#[tokio::test]
async fn submit_without_staged_file_is_a_validation_error() {
    let (manager, _provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for("http://127.0.0.1:1")).unwrap();
    let mut controller = SyncController::new(client);

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, VaultError::Validation(_)));
}

#[tokio::test]
async fn every_backend_call_mints_a_fresh_token() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/files")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(2)
        .create_async()
        .await;

    let (manager, provider) = signed_in_session().await;
    let client = FileClient::new(manager, &config_for(&server.url())).unwrap();

    client.list_files().await.unwrap();
    client.list_files().await.unwrap();
    assert_eq!(provider.issue_token_calls(), 2);
}
