//! Shared test helpers for NodeImage API integration tests
//!
//! Each helper mounts wiremock endpoints and returns a client pointing at
//! the mock server.

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nib_api::client::NodeImageClient;

pub const TEST_KEY: &str = "test-api-key";

/// Starts a mock server and returns it with a client targeting it.
pub async fn setup_mock() -> (MockServer, NodeImageClient) {
    let server = MockServer::start().await;
    let client = NodeImageClient::with_base_url(TEST_KEY, server.uri());
    (server, client)
}

/// Builds a listing image entry whose direct link points at the mock server.
pub fn image_json(server: &MockServer, id: &str, filename: &str, size: u64) -> Value {
    json!({
        "image_id": id,
        "filename": filename,
        "size": size,
        "links": { "direct": format!("{}/i/{}", server.uri(), filename) }
    })
}

/// Mounts a successful listing that only answers requests carrying the test key.
pub async fn mount_listing(server: &MockServer, images: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .and(header("X-API-Key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "images": images
        })))
        .mount(server)
        .await;
}

/// Mounts a direct-link endpoint serving `content`.
pub async fn mount_image(server: &MockServer, filename: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/i/{filename}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .insert_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}
