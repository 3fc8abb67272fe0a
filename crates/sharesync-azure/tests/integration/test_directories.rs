//! Integration tests for directory creation and request authorization

use sharesync_azure::StorageCredential;
use sharesync_core::domain::{RemoteError, SharePath};
use sharesync_core::usecases::DirectoryManager;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

// ============================================================================
// DirectoryClient
// ============================================================================

#[tokio::test]
async fn test_create_directory_sends_versioned_put() {
    let (server, client) = common::setup_share_mock().await;

    Mock::given(method("PUT"))
        .and(path(common::share_path("reports")))
        .and(query_param("restype", "directory"))
        .and(header("x-ms-version", "2023-11-03"))
        .and(header_exists("x-ms-date"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = SharePath::normalize("reports").unwrap();
    client
        .directory_client(&dir)
        .create()
        .await
        .expect("create directory failed");
}

#[tokio::test]
async fn test_existing_directory_maps_to_already_exists() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_create_directory(&server, "reports", 409).await;

    let dir = SharePath::normalize("reports").unwrap();
    let err = client.directory_client(&dir).create().await.unwrap_err();

    assert!(matches!(
        err,
        RemoteError::AlreadyExists { ref path, status: 409 } if path == "./reports"
    ));
}

#[tokio::test]
async fn test_missing_parent_maps_to_not_found() {
    let (server, client) = common::setup_share_mock().await;

    Mock::given(method("PUT"))
        .and(path(common::share_path("a/b")))
        .respond_with(common::azure_error(404, "ParentNotFound"))
        .mount(&server)
        .await;

    let dir = SharePath::normalize("a/b").unwrap();
    let err = client.directory_client(&dir).create().await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(_)));
}

#[tokio::test]
async fn test_auth_failure_keeps_service_message() {
    let (server, client) = common::setup_share_mock().await;

    Mock::given(method("PUT"))
        .respond_with(common::azure_error(403, "AuthenticationFailed"))
        .mount(&server)
        .await;

    let dir = SharePath::normalize("reports").unwrap();
    let err = client.directory_client(&dir).create().await.unwrap_err();

    match err {
        RemoteError::Unauthorized(message) => {
            assert_eq!(
                message,
                "AuthenticationFailed: AuthenticationFailed raised by mock"
            );
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

// ============================================================================
// DirectoryManager over the Azure adapter
// ============================================================================

#[tokio::test]
async fn test_ensure_path_creates_each_level_in_order() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_create_directory(&server, "reports", 409).await;
    common::mount_create_directory(&server, "reports/2024", 201).await;
    common::mount_create_directory(&server, "reports/2024/q1", 201).await;

    let manager = DirectoryManager::new(common::store(&client));
    let ensured = manager
        .ensure_path(&SharePath::normalize("reports/2024/q1").unwrap())
        .await
        .expect("ensure_path failed");
    assert_eq!(ensured.as_str(), "./reports/2024/q1/");

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            common::share_path("reports"),
            common::share_path("reports/2024"),
            common::share_path("reports/2024/q1"),
        ]
    );
}

#[tokio::test]
async fn test_ensure_path_is_idempotent_against_service() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_create_directory(&server, "reports", 409).await;
    common::mount_create_directory(&server, "reports/2024", 409).await;

    let manager = DirectoryManager::new(common::store(&client));
    let path = SharePath::normalize("reports/2024").unwrap();

    assert!(manager.ensure_path(&path).await.is_ok());
    assert!(manager.ensure_path(&path).await.is_ok());
}

// ============================================================================
// Authorization headers
// ============================================================================

#[tokio::test]
async fn test_shared_key_requests_are_signed() {
    let server = wiremock::MockServer::start().await;
    let credential = StorageCredential::shared_key("acct", "c2VjcmV0LWtleQ==").unwrap();
    let client = common::client_with(&server, credential);
    common::mount_create_directory(&server, "reports", 201).await;

    let dir = SharePath::normalize("reports").unwrap();
    client.directory_client(&dir).create().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap();
    assert!(auth.to_str().unwrap().starts_with("SharedKeyLite acct:"));
}

#[tokio::test]
async fn test_bearer_requests_declare_backup_intent() {
    let server = wiremock::MockServer::start().await;
    let client = common::client_with(&server, StorageCredential::BearerToken("tok".into()));

    Mock::given(method("PUT"))
        .and(header("authorization", "Bearer tok"))
        .and(header("x-ms-file-request-intent", "backup"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = SharePath::normalize("reports").unwrap();
    client.directory_client(&dir).create().await.unwrap();
}
