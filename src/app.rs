// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Demo application: a JavaScript-rendered page behind the snapshot middleware.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::error::Result;
use crate::models::settings::Settings;
use crate::models::version::VersionResponse;
use crate::services::classifier::Classifier;
use crate::services::client::SnapshotClient;
use crate::services::interceptor::{Hooks, Interceptor};
use crate::services::middleware::{snapsearch_middleware, SnapSearchState};
use axum::{extract::State, middleware, response::Html, routing::get, Json, Router};
use std::sync::Arc;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `SNAPSEARCH_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("SNAPSEARCH_VERSION");

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>SnapSearch demo</title></head>
<body>
<div id="app">Loading...</div>
<script>
document.getElementById("app").textContent = "Rendered in the browser at " + location.hash;
</script>
</body>
</html>
"#;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub api_url: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "snapsearch-agent".to_string(),
        version: VERSION.to_string(),
        api_url: state.api_url,
    })
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the snapshot middleware state from loaded settings.
pub fn snapsearch_state(settings: Settings, hooks: Hooks) -> Result<SnapSearchState> {
    let classifier = Arc::new(Classifier::new(settings.classifier)?);
    let client = Arc::new(SnapshotClient::new(settings.client)?);
    let interceptor = Interceptor::new(classifier, client).with_hooks(hooks);

    let mut state =
        SnapSearchState::new(Arc::new(interceptor)).with_x_forwarded_proto(settings.x_forwarded_proto);
    if let Some(root) = settings.document_root {
        state = state.with_document_root(root);
    }
    Ok(state)
}

/// Build the Axum application router.
///
/// Every route, including the fallback page, is wrapped by the snapshot middleware.
pub fn create_router(state: AppState, snapsearch: SnapSearchState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/", get(index_handler))
        .fallback(index_handler)
        .with_state(state)
        .layer(middleware::from_fn_with_state(snapsearch, snapsearch_middleware))
}
