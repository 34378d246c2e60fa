//! Integration tests for the listing endpoint

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use nib_api::provider::NodeImageInventory;
use nib_api::ApiError;
use nib_core::ports::IRemoteInventory;

use crate::common;

#[tokio::test]
async fn test_list_images_parses_entries_in_order() {
    let (server, client) = common::setup_mock().await;
    common::mount_listing(
        &server,
        vec![
            common::image_json(&server, "id-2", "b.png", 20),
            common::image_json(&server, "id-1", "a.jpg", 10),
        ],
    )
    .await;

    let images = client.list_images().await.expect("list_images failed");

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].filename, "b.png");
    assert_eq!(images[0].id, "id-2");
    assert_eq!(images[1].size, 10);
    assert_eq!(images[1].links.direct, format!("{}/i/a.jpg", server.uri()));
}

#[tokio::test]
async fn test_list_images_empty_account() {
    let (server, client) = common::setup_mock().await;
    common::mount_listing(&server, vec![]).await;

    let images = client.list_images().await.expect("list_images failed");
    assert!(images.is_empty());
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let server = wiremock::MockServer::start().await;
    common::mount_listing(&server, vec![]).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = nib_api::client::NodeImageClient::with_base_url("wrong", server.uri());
    let err = client.list_images().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(401)), "got {err:?}");
}

#[tokio::test]
async fn test_server_error_status() {
    let (server, client) = common::setup_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.list_images().await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_success_false_is_an_error() {
    let (server, client) = common::setup_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "quota exceeded"
        })))
        .mount(&server)
        .await;

    let err = client.list_images().await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "quota exceeded"));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let (server, client) = common::setup_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_images().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_inventory_maps_entries() {
    let (server, client) = common::setup_mock().await;
    common::mount_listing(&server, vec![common::image_json(&server, "x", "x.gif", 7)]).await;

    let inventory = NodeImageInventory::new(client);
    let entries = inventory.list_entries().await.expect("list_entries failed");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "x");
    assert_eq!(entries[0].filename, "x.gif");
    assert_eq!(entries[0].size, 7);
    assert_eq!(entries[0].url, format!("{}/i/x.gif", server.uri()));
}

#[tokio::test]
async fn test_inventory_listing_failure_propagates() {
    let (server, client) = common::setup_mock().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let inventory = NodeImageInventory::new(client);
    let err = inventory.list_entries().await.unwrap_err();
    assert!(err.to_string().contains("Failed to fetch remote image list"));
}
