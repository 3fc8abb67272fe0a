//! Integration tests for file creation, ranged uploads and downloads
//!
//! Covers the file client on its own and the full upload/download flow of
//! `FileTransferService` over the Azure adapter.

use futures_util::TryStreamExt;
use sharesync_core::domain::{RemoteError, SharePath, TransferError};
use sharesync_core::usecases::FileTransferService;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, ResponseTemplate};

use sharesync_azure::file::MAX_RANGE_SIZE;

use crate::common;

// ============================================================================
// FileClient
// ============================================================================

#[tokio::test]
async fn test_create_file_is_conflict_checked() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_file_exists(&server, "inbox/a.txt", false).await;

    Mock::given(method("PUT"))
        .and(path(common::share_path("inbox/a.txt")))
        .and(header("x-ms-type", "file"))
        .and(header("x-ms-content-length", "42"))
        .and(header("if-none-match", "*"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let file = SharePath::normalize("inbox/a.txt").unwrap();
    client
        .file_client(&file)
        .create(42)
        .await
        .expect("create file failed");
}

#[tokio::test]
async fn test_create_file_on_existing_path_sends_no_put() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_file_exists(&server, "a.txt", true).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let file = SharePath::normalize("a.txt").unwrap();
    let err = client.file_client(&file).create(1).await.unwrap_err();
    assert!(err.is_already_exists());
}

#[tokio::test]
async fn test_create_file_precondition_failure_is_a_collision() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_file_exists(&server, "a.txt", false).await;

    Mock::given(method("PUT"))
        .and(path(common::share_path("a.txt")))
        .respond_with(common::azure_error(412, "ConditionNotMet"))
        .mount(&server)
        .await;

    let file = SharePath::normalize("a.txt").unwrap();
    let err = client.file_client(&file).create(1).await.unwrap_err();
    assert!(matches!(err, RemoteError::AlreadyExists { status: 412, .. }));
}

#[tokio::test]
async fn test_write_splits_content_into_ranges() {
    let (server, client) = common::setup_share_mock().await;

    Mock::given(method("PUT"))
        .and(path(common::share_path("big.bin")))
        .and(query_param("comp", "range"))
        .and(header("x-ms-write", "update"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let data: Vec<u8> = (0..MAX_RANGE_SIZE + 1024).map(|i| (i % 251) as u8).collect();
    let file = SharePath::normalize("big.bin").unwrap();
    client
        .file_client(&file)
        .write(&data)
        .await
        .expect("write failed");

    let requests = server.received_requests().await.unwrap();
    let ranges: Vec<&str> = requests
        .iter()
        .map(|r| r.headers.get("x-ms-range").unwrap().to_str().unwrap())
        .collect();
    assert_eq!(
        ranges,
        vec![
            format!("bytes=0-{}", MAX_RANGE_SIZE - 1),
            format!("bytes={}-{}", MAX_RANGE_SIZE, MAX_RANGE_SIZE + 1023),
        ]
    );

    let uploaded: Vec<u8> = requests.iter().flat_map(|r| r.body.clone()).collect();
    assert_eq!(uploaded, data);
}

#[tokio::test]
async fn test_download_streams_content() {
    let (server, client) = common::setup_share_mock().await;
    let content: Vec<u8> = (0..1_048_576).map(|i| (i % 256) as u8).collect();
    common::mount_download(&server, "reports/large.bin", &content).await;

    let file = SharePath::normalize("reports/large.bin").unwrap();
    let stream = client.file_client(&file).download().await.unwrap();
    let chunks: Vec<Vec<u8>> = stream.try_collect().await.unwrap();

    assert_eq!(chunks.concat(), content);
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let (server, client) = common::setup_share_mock().await;

    Mock::given(method("GET"))
        .respond_with(common::azure_error(404, "ResourceNotFound"))
        .mount(&server)
        .await;

    let file = SharePath::normalize("missing.txt").unwrap();
    let result = client.file_client(&file).download().await;
    assert!(matches!(result, Err(RemoteError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_file() {
    let (server, client) = common::setup_share_mock().await;
    common::mount_delete(&server, "inbox/a.txt").await;

    let file = SharePath::normalize("inbox/a.txt").unwrap();
    client
        .file_client(&file)
        .delete()
        .await
        .expect("delete file failed");
}

// ============================================================================
// FileTransferService over the Azure adapter
// ============================================================================

#[tokio::test]
async fn test_upload_to_free_destination() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("invoice.csv");
    std::fs::write(&source, b"id,total\n1,9.99\n").unwrap();

    let (server, client) = common::setup_share_mock().await;
    common::mount_create_directory(&server, "reports", 201).await;
    common::mount_file_exists(&server, "reports/invoice.csv", false).await;

    Mock::given(method("PUT"))
        .and(path(common::share_path("reports/invoice.csv")))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let service = FileTransferService::new(common::store(&client));
    let outcome = service
        .upload_file("reports/invoice.csv", &source)
        .await
        .expect("upload failed");

    assert!(!outcome.was_renamed());
    assert_eq!(outcome.path(), "reports/invoice.csv");
}

#[tokio::test]
async fn test_upload_collision_writes_alternate_and_leaves_original() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("invoice.csv");
    std::fs::write(&source, b"second upload").unwrap();

    let (server, client) = common::setup_share_mock().await;
    for level in ["reports", "reports/2024", "reports/2024/q1"] {
        common::mount_create_directory(&server, level, 409).await;
    }
    common::mount_file_exists(&server, "reports/2024/q1/invoice.csv", true).await;

    // The occupied destination must never receive content
    Mock::given(method("PUT"))
        .and(path(common::share_path("reports/2024/q1/invoice.csv")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let alternate = r"^/acct/share/reports/2024/q1/invoice_\d{8}T\d{6}_[0-9a-f]{8}\.csv$";
    Mock::given(method("HEAD"))
        .and(path_regex(alternate))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(alternate))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let service = FileTransferService::new(common::store(&client));
    let outcome = service
        .upload_file("reports/2024/q1/invoice.csv", &source)
        .await
        .expect("upload failed");

    assert!(outcome.was_renamed());
    assert!(outcome.path().starts_with("reports/2024/q1/invoice_"));
    assert!(outcome.path().ends_with(".csv"));

    let written: Vec<u8> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.query() == Some("comp=range"))
        .flat_map(|r| r.body)
        .collect();
    assert_eq!(written, b"second upload");
}

#[tokio::test]
async fn test_upload_failure_surfaces_remote_error() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("a.txt");
    std::fs::write(&source, b"a").unwrap();

    let (server, client) = common::setup_share_mock().await;
    common::mount_file_exists(&server, "a.txt", false).await;
    Mock::given(method("PUT"))
        .respond_with(common::azure_error(500, "InternalError"))
        .mount(&server)
        .await;

    let service = FileTransferService::new(common::store(&client));
    let err = service.upload_file("a.txt", &source).await.unwrap_err();

    assert!(matches!(
        err,
        TransferError::Remote {
            source: RemoteError::Status { status: 500, .. },
            ..
        }
    ));
    assert!(err.to_string().contains("InternalError"));
}

#[tokio::test]
async fn test_failed_write_deletes_created_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("a.txt");
    std::fs::write(&source, b"payload").unwrap();

    let (server, client) = common::setup_share_mock().await;
    common::mount_file_exists(&server, "a.txt", false).await;
    Mock::given(method("PUT"))
        .and(path(common::share_path("a.txt")))
        .and(query_param("comp", "range"))
        .respond_with(common::azure_error(500, "InternalError"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(common::share_path("a.txt")))
        .and(header("x-ms-type", "file"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    common::mount_delete(&server, "a.txt").await;

    let service = FileTransferService::new(common::store(&client));
    let err = service.upload_file("a.txt", &source).await.unwrap_err();

    assert!(matches!(
        err,
        TransferError::Remote {
            source: RemoteError::Status { status: 500, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_download_to_local_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out").join("report.csv");

    let (server, client) = common::setup_share_mock().await;
    common::mount_download(&server, "reports/report.csv", b"a,b\n1,2\n").await;

    let service = FileTransferService::new(common::store(&client));
    let written = service
        .download_file("reports/report.csv", &target)
        .await
        .expect("download failed");

    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"a,b\n1,2\n");
}

#[tokio::test]
async fn test_failed_download_leaves_no_local_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("report.csv");

    let (server, client) = common::setup_share_mock().await;
    Mock::given(method("GET"))
        .respond_with(common::azure_error(403, "AuthorizationFailure"))
        .mount(&server)
        .await;

    let service = FileTransferService::new(common::store(&client));
    let err = service
        .download_file("reports/report.csv", &target)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransferError::Remote {
            operation: "download_file",
            source: RemoteError::Unauthorized(_),
            ..
        }
    ));
    assert!(!target.exists());
}
