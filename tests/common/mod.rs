// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! In-process stand-in for the rendering API.

#![allow(dead_code)]

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

pub const EMAIL: &str = "robot@example.com";
pub const KEY: &str = "0123456789abcdef";

/// Requests received by the fake API: (authorization header, JSON body).
#[derive(Clone, Default)]
pub struct Received(pub Arc<Mutex<Vec<(String, Value)>>>);

impl Received {
    pub fn bodies(&self) -> Vec<Value> {
        self.0.lock().iter().map(|(_, body)| body.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.0.lock().len()
    }
}

async fn robot_handler(
    State(received): State<Received>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    received.0.lock().push((authorization, body.clone()));

    let url = body["url"].as_str().unwrap_or_default().to_string();
    if url.contains("validation") {
        return (
            StatusCode::OK,
            Json(json!({
                "code": "validation_error",
                "content": {"url": "The url is not allowed."}
            })),
        );
    }
    if url.contains("system") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"code": "system_error", "content": ""})),
        );
    }

    let mut headers = vec![json!({"name": "Content-Type", "value": "text/html"})];
    if url.contains("moved") {
        headers.push(json!({"name": "Location", "value": "http://localhost/new-home"}));
    }
    let status = if url.contains("moved") { 301 } else { 200 };

    (
        StatusCode::OK,
        Json(json!({
            "code": "success",
            "content": {
                "status": status,
                "headers": headers,
                "html": format!("<html><body>snapshot of {url}</body></html>"),
                "screenshot": "",
                "date": 1384885421
            }
        })),
    )
}

/// Start the fake API and return its `/api/v1/robot` URL.
pub async fn spawn_fake_api() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/api/v1/robot", post(robot_handler))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind fake API");
    let addr = listener.local_addr().expect("Fake API has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake API failed");
    });

    (format!("http://{addr}/api/v1/robot"), received)
}

/// An address nothing listens on.
pub async fn closed_api_url() -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No address");
    drop(listener);
    format!("http://{addr}/api/v1/robot")
}
