// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::{Result, SnapSearchError};
use crate::models::config::ClientConfig;
use crate::models::snapshot::{SnapshotContent, SnapshotResult};
use crate::services::logging::{anonymize_email, anonymize_key};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

/// Source of rendered snapshots.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Render `url`. Makes exactly one attempt.
    async fn fetch(&self, url: &str) -> SnapshotResult;
}

/// Authenticated client for the rendering API.
pub struct SnapshotClient {
    http: reqwest::Client,
    email: String,
    key: String,
    api_url: String,
    parameters: serde_json::Map<String, Value>,
}

impl std::fmt::Debug for SnapshotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotClient")
            .field("email", &anonymize_email(&self.email))
            .field("key", &anonymize_key(&self.key))
            .field("api_url", &self.api_url)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl SnapshotClient {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if !config.email.contains('@') {
            return Err(SnapSearchError::configuration(
                "email must be an email address",
            ));
        }

        let api_url = url::Url::parse(&config.api_url).map_err(|e| {
            SnapSearchError::configuration(format!("Invalid api_url '{}': {e}", config.api_url))
        })?;
        if api_url.scheme() != "http" && api_url.scheme() != "https" {
            return Err(SnapSearchError::configuration(format!(
                "api_url must use http or https, got '{}'",
                api_url.scheme()
            )));
        }

        if config.parameters.contains_key("url") {
            return Err(SnapSearchError::configuration(
                "parameters must not contain 'url', it is set per request",
            ));
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout);

        if let Some(path) = &config.ca_cert_file {
            let pem = std::fs::read(path).map_err(|e| {
                SnapSearchError::configuration(format!(
                    "Failed to read CA certificate file {}: {e}",
                    path.display()
                ))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                SnapSearchError::configuration(format!(
                    "Invalid CA certificate file {}: {e}",
                    path.display()
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder.build().map_err(|e| {
            SnapSearchError::configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        tracing::info!(
            email = %anonymize_email(&config.email),
            api_url = %config.api_url,
            "SnapSearch client configured"
        );

        Ok(Self {
            http,
            email: config.email,
            key: config.key,
            api_url: config.api_url,
            parameters: config.parameters,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Request body: the extra parameters plus the URL to render.
    fn request_body(&self, url: &str) -> String {
        let mut body = self.parameters.clone();
        body.insert("url".to_string(), Value::String(url.to_string()));
        Value::Object(body).to_string()
    }
}

#[async_trait]
impl SnapshotFetcher for SnapshotClient {
    async fn fetch(&self, url: &str) -> SnapshotResult {
        let sent = self
            .http
            .post(&self.api_url)
            .basic_auth(&self.email, Some(&self.key))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(self.request_body(url))
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "Could not reach the rendering API");
                return SnapshotResult::ConnectionFailure(e.to_string());
            }
        };

        let status = response.status();
        match response.bytes().await {
            Ok(body) => {
                tracing::debug!(url, %status, bytes = body.len(), "Rendering API responded");
                interpret_response(&body)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to read rendering API response");
                SnapshotResult::ConnectionFailure(e.to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    content: Value,
}

/// Translate a rendering API response body into a [`SnapshotResult`].
pub fn interpret_response(body: &[u8]) -> SnapshotResult {
    let envelope: ApiEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Rendering API returned a malformed body");
            return SnapshotResult::SystemFailure;
        }
    };

    match envelope.code.as_deref() {
        Some("success") => match serde_json::from_value::<SnapshotContent>(envelope.content) {
            Ok(content) => SnapshotResult::Success(content),
            Err(e) => {
                tracing::warn!(error = %e, "Rendering API success payload is malformed");
                SnapshotResult::SystemFailure
            }
        },
        Some("validation_error") => {
            SnapshotResult::ValidationFailure(validation_messages(envelope.content))
        }
        code => {
            tracing::warn!(code = ?code, "Rendering API reported a system error");
            SnapshotResult::SystemFailure
        }
    }
}

fn validation_messages(content: Value) -> Vec<(String, String)> {
    match content {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(field, message)| (field, message_text(message)))
            .collect(),
        Value::Null => Vec::new(),
        other => vec![("content".to_string(), message_text(other))],
    }
}

fn message_text(message: Value) -> String {
    match message {
        Value::String(text) => text,
        Value::Array(items) => items
            .into_iter()
            .map(message_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
