//! Integration tests for streaming downloads through the inventory adapter

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use nib_api::provider::NodeImageInventory;
use nib_core::domain::inventory::RemoteItem;
use nib_core::domain::newtypes::{RelativePath, RemoteId};
use nib_core::ports::IRemoteInventory;

use crate::common;

fn item(url: String, name: &str, size: u64) -> RemoteItem {
    RemoteItem {
        filename: RelativePath::new(name).unwrap(),
        size,
        url,
        remote_id: Some(RemoteId::new(format!("id-{name}")).unwrap()),
    }
}

#[tokio::test]
async fn test_download_streams_whole_body() {
    let (server, client) = common::setup_mock().await;
    let content: Vec<u8> = (0..=255u8).cycle().take(300_000).collect();
    common::mount_image(&server, "big.png", &content).await;

    let inventory = NodeImageInventory::new(client);
    let target = item(format!("{}/i/big.png", server.uri()), "big.png", 300_000);

    let mut body = inventory.open_download(&target).await.expect("open failed");
    let mut received = Vec::new();
    while let Some(chunk) = body.next_chunk().await.expect("chunk failed") {
        received.extend_from_slice(&chunk);
    }

    assert_eq!(received, content);
}

#[tokio::test]
async fn test_download_error_status_fails_before_body() {
    let (server, client) = common::setup_mock().await;
    Mock::given(method("GET"))
        .and(path("/i/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let inventory = NodeImageInventory::new(client);
    let target = item(format!("{}/i/gone.png", server.uri()), "gone.png", 1);

    let err = inventory.open_download(&target).await.err().expect("expected error");
    assert!(format!("{err:#}").contains("404"), "got {err:#}");
}

#[tokio::test]
async fn test_download_without_link_fails() {
    let (_server, client) = common::setup_mock().await;
    let inventory = NodeImageInventory::new(client);
    let target = item(String::new(), "nolink.png", 1);

    assert!(inventory.open_download(&target).await.is_err());
}

#[tokio::test]
async fn test_download_does_not_send_api_key() {
    let (server, client) = common::setup_mock().await;
    common::mount_image(&server, "a.png", b"abc").await;

    let inventory = NodeImageInventory::new(client);
    let target = item(format!("{}/i/a.png", server.uri()), "a.png", 3);
    let mut body = inventory.open_download(&target).await.expect("open failed");
    while body.next_chunk().await.expect("chunk failed").is_some() {}

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("X-API-Key").is_none());
}
