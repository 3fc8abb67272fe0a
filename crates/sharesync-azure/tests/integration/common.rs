//! Shared test helpers for Azure Files integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server. Clients point at
//! `{server}/acct`, so share `share` lives under `/acct/share`.

use std::sync::Arc;

use sharesync_azure::{AzureShareStore, ShareClient, StorageCredential};
use sharesync_core::ports::IShareStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Share name used by every test client
pub const SHARE: &str = "share";

/// URL path prefix of the test share
pub fn share_path(relative: &str) -> String {
    if relative.is_empty() {
        format!("/acct/{SHARE}")
    } else {
        format!("/acct/{SHARE}/{relative}")
    }
}

/// Starts a mock server and returns an anonymous client for it
pub async fn setup_share_mock() -> (MockServer, ShareClient) {
    let server = MockServer::start().await;
    let client = client_with(&server, StorageCredential::Anonymous);
    (server, client)
}

pub fn client_with(server: &MockServer, credential: StorageCredential) -> ShareClient {
    ShareClient::new(&format!("{}/acct", server.uri()), SHARE, credential)
        .expect("valid mock server URL")
}

pub fn store(client: &ShareClient) -> Arc<dyn IShareStore> {
    Arc::new(AzureShareStore::new(client.clone()))
}

/// `x-ms-error-code` response for a failed call
pub fn azure_error(status: u16, code: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .append_header("x-ms-error-code", code)
        .set_body_string(format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>{code}</Code>\
             <Message>{code} raised by mock</Message></Error>"
        ))
}

/// Mounts directory creation for `relative`, answering `status`
pub async fn mount_create_directory(server: &MockServer, relative: &str, status: u16) {
    let response = if status == 409 {
        azure_error(409, "ResourceAlreadyExists")
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("PUT"))
        .and(path(share_path(relative)))
        .and(query_param("restype", "directory"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts the existence probe for a file
pub async fn mount_file_exists(server: &MockServer, relative: &str, exists: bool) {
    let response = if exists {
        ResponseTemplate::new(200).append_header("x-ms-type", "File")
    } else {
        ResponseTemplate::new(404).append_header("x-ms-error-code", "ResourceNotFound")
    };
    Mock::given(method("HEAD"))
        .and(path(share_path(relative)))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a file download returning `content`
pub async fn mount_download(server: &MockServer, relative: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(share_path(relative)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts a file delete, expected exactly once
pub async fn mount_delete(server: &MockServer, relative: &str) {
    Mock::given(method("DELETE"))
        .and(path(share_path(relative)))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(server)
        .await;
}
