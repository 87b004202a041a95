// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

mod common;

use common::{closed_api_url, spawn_fake_api, EMAIL, KEY};
use snapsearch_agent::models::config::ClientConfig;
use snapsearch_agent::models::snapshot::SnapshotResult;
use snapsearch_agent::services::client::{SnapshotClient, SnapshotFetcher};
use std::time::Duration;

fn client(api_url: &str) -> SnapshotClient {
    let config = ClientConfig::new(EMAIL, KEY)
        .with_api_url(api_url)
        .with_parameter("width", serde_json::json!(1280))
        .with_timeout(Duration::from_secs(5));
    SnapshotClient::new(config).expect("Failed to build client")
}

#[tokio::test]
async fn test_fetch_success() {
    let (api_url, received) = spawn_fake_api().await;

    let result = client(&api_url).fetch("http://localhost/page#!/about").await;

    let SnapshotResult::Success(content) = result else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(content.status, 200);
    assert_eq!(content.header("content-type"), Some("text/html"));
    assert!(content.html.contains("snapshot of http://localhost/page#!/about"));

    assert_eq!(received.count(), 1);
    let bodies = received.bodies();
    assert_eq!(bodies[0]["url"], "http://localhost/page#!/about");
    assert_eq!(bodies[0]["width"], 1280);
}

#[tokio::test]
async fn test_fetch_sends_basic_auth() {
    let (api_url, received) = spawn_fake_api().await;

    client(&api_url).fetch("http://localhost/").await;

    let authorization = received.0.lock()[0].0.clone();
    // base64("robot@example.com:0123456789abcdef")
    assert_eq!(
        authorization,
        "Basic cm9ib3RAZXhhbXBsZS5jb206MDEyMzQ1Njc4OWFiY2RlZg=="
    );
}

#[tokio::test]
async fn test_fetch_validation_error() {
    let (api_url, _received) = spawn_fake_api().await;

    let result = client(&api_url).fetch("http://localhost/validation").await;

    assert_eq!(
        result,
        SnapshotResult::ValidationFailure(vec![(
            "url".to_string(),
            "The url is not allowed.".to_string()
        )])
    );
}

#[tokio::test]
async fn test_fetch_system_error() {
    let (api_url, _received) = spawn_fake_api().await;

    let result = client(&api_url).fetch("http://localhost/system").await;
    assert_eq!(result, SnapshotResult::SystemFailure);
}

#[tokio::test]
async fn test_fetch_connection_failure() {
    let api_url = closed_api_url().await;

    let result = client(&api_url).fetch("http://localhost/").await;
    assert!(matches!(result, SnapshotResult::ConnectionFailure(_)));
}
