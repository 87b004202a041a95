// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Axum adapter for the [`Interceptor`].
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/", get(index))
//!     .layer(axum::middleware::from_fn_with_state(snapsearch, snapsearch_middleware));
//! ```

use crate::models::outcome::{InterceptionOutcome, ResponseParts};
use crate::models::request::RequestFacts;
use crate::services::interceptor::Interceptor;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use std::sync::Arc;

/// State shared by every invocation of [`snapsearch_middleware`].
#[derive(Clone)]
pub struct SnapSearchState {
    interceptor: Arc<Interceptor>,
    document_root: Option<PathBuf>,
    x_forwarded_proto: bool,
}

impl SnapSearchState {
    pub fn new(interceptor: Arc<Interceptor>) -> Self {
        Self {
            interceptor,
            document_root: None,
            x_forwarded_proto: false,
        }
    }

    /// Directory checked when static-file detection is enabled.
    pub fn with_document_root(mut self, document_root: impl Into<PathBuf>) -> Self {
        self.document_root = Some(document_root.into());
        self
    }

    /// Trust `X-Forwarded-Proto` for the request scheme, for TLS terminated upstream.
    pub fn with_x_forwarded_proto(mut self, enabled: bool) -> Self {
        self.x_forwarded_proto = enabled;
        self
    }

    /// Project the parts of `request` the classifier needs.
    pub fn request_facts<B>(&self, request: &axum::http::Request<B>) -> RequestFacts {
        let headers = request.headers();
        let uri = request.uri();

        let scheme = self
            .forwarded_scheme(headers)
            .or_else(|| uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());

        let facts = RequestFacts::new(
            request.method().as_str(),
            scheme,
            request_host(headers, uri),
            uri.path_and_query().map_or(uri.path(), |pq| pq.as_str()),
            header_text(headers, &header::USER_AGENT).unwrap_or_default(),
        );

        match &self.document_root {
            Some(root) => facts.with_document_root(root),
            None => facts,
        }
    }

    fn forwarded_scheme(&self, headers: &HeaderMap) -> Option<String> {
        if !self.x_forwarded_proto {
            return None;
        }
        let value = header_text(headers, &HeaderName::from_static("x-forwarded-proto"))?;
        let first = value.split(',').next()?.trim();
        (!first.is_empty()).then(|| first.to_ascii_lowercase())
    }
}

/// Run the application, then replace its response with a snapshot when the
/// request comes from a robot.
pub async fn snapsearch_middleware(
    State(state): State<SnapSearchState>,
    request: Request,
    next: Next,
) -> Response {
    let facts = state.request_facts(&request);
    let response = next.run(request).await;

    match state.interceptor.intercept(&facts).await {
        Ok(InterceptionOutcome::PassThrough) => response,
        Ok(InterceptionOutcome::Override(parts)) => graft(response, parts),
        Err(err) => err.into_response(),
    }
}

/// Apply an override onto the origin response, keeping its other headers.
pub fn graft(response: Response, parts: ResponseParts) -> Response {
    let (mut head, _origin_body) = response.into_parts();

    match StatusCode::from_u16(parts.status) {
        Ok(status) => head.status = status,
        Err(_) => tracing::warn!(
            status = parts.status,
            "Snapshot status is not a valid HTTP status, keeping origin status"
        ),
    }

    // The origin body is replaced, so its framing headers no longer apply.
    head.headers.remove(header::CONTENT_LENGTH);
    head.headers.remove(header::CONTENT_ENCODING);
    head.headers.remove(header::TRANSFER_ENCODING);

    for (name, value) in parts.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                head.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid snapshot header"),
        }
    }

    Response::from_parts(head, Body::from(parts.body))
}

fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    header_text(headers, &header::HOST)
        .or_else(|| uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_else(|| "localhost".to_string())
}

fn header_text(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ClassifierConfig;
    use crate::models::snapshot::SnapshotResult;
    use crate::services::classifier::Classifier;
    use crate::services::client::SnapshotFetcher;
    use async_trait::async_trait;

    struct NeverCalled;

    #[async_trait]
    impl SnapshotFetcher for NeverCalled {
        async fn fetch(&self, _url: &str) -> SnapshotResult {
            SnapshotResult::SystemFailure
        }
    }

    fn state() -> SnapSearchState {
        let classifier = Arc::new(Classifier::new(ClassifierConfig::default()).unwrap());
        SnapSearchState::new(Arc::new(Interceptor::new(classifier, Arc::new(NeverCalled))))
    }

    #[test]
    fn test_request_facts_from_http_request() {
        let request = axum::http::Request::builder()
            .method("GET")
            .uri("/shop/item?_escaped_fragment_=details")
            .header("host", "example.com:8080")
            .header("user-agent", "Googlebot/2.1")
            .body(())
            .unwrap();

        let facts = state().with_document_root("/srv/www").request_facts(&request);

        assert_eq!(facts.method, "GET");
        assert_eq!(facts.scheme, "http");
        assert_eq!(facts.host, "example.com:8080");
        assert_eq!(facts.path, "/shop/item");
        assert_eq!(facts.query, "_escaped_fragment_=details");
        assert_eq!(facts.user_agent, "Googlebot/2.1");
        assert_eq!(facts.document_root, Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn test_forwarded_proto_only_when_enabled() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header("host", "example.com")
            .header("x-forwarded-proto", "HTTPS, http")
            .body(())
            .unwrap();

        assert_eq!(state().request_facts(&request).scheme, "http");
        assert_eq!(
            state()
                .with_x_forwarded_proto(true)
                .request_facts(&request)
                .scheme,
            "https"
        );
    }

    #[test]
    fn test_graft_replaces_status_body_and_location() {
        let origin = Response::builder()
            .status(StatusCode::OK)
            .header("content-length", "5")
            .header("x-origin", "kept")
            .header("location", "http://old")
            .body(Body::from("hello"))
            .unwrap();

        let grafted = graft(
            origin,
            ResponseParts {
                status: 301,
                headers: vec![("Location".to_string(), "http://new".to_string())],
                body: "<html/>".to_string(),
            },
        );

        assert_eq!(grafted.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(grafted.headers()["location"], "http://new");
        assert_eq!(grafted.headers()["x-origin"], "kept");
        assert!(grafted.headers().get("content-length").is_none());
    }

    #[test]
    fn test_graft_keeps_origin_status_when_invalid() {
        let origin = Response::builder()
            .status(StatusCode::OK)
            .body(Body::empty())
            .unwrap();

        let grafted = graft(
            origin,
            ResponseParts {
                status: 42,
                headers: vec![("bad header".to_string(), "x".to_string())],
                body: String::new(),
            },
        );

        assert_eq!(grafted.status(), StatusCode::OK);
        assert!(grafted.headers().get("bad header").is_none());
    }
}
