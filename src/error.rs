// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error types shared by the classifier, the snapshot client and the interceptor.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by SnapSearch components.
///
/// `Configuration` is raised while building components and should abort startup.
/// `Connection` and `Validation` are per-request and always reach the caller,
/// either through the registered exception hook or as an `Err`.
#[derive(Debug, Error)]
pub enum SnapSearchError {
    /// Malformed configuration or data source.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The rendering API could not be reached.
    #[error("Could not establish a connection to SnapSearch: {0}")]
    Connection(String),

    /// The rendering API rejected the request parameters.
    #[error(
        "Validation error from SnapSearch. Check your request parameters:\n{}",
        format_messages(.messages)
    )]
    Validation { messages: Vec<(String, String)> },
}

fn format_messages(messages: &[(String, String)]) -> String {
    messages
        .iter()
        .map(|(_, message)| format!("    {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl SnapSearchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        SnapSearchError::Configuration(message.into())
    }
}

impl From<regex::Error> for SnapSearchError {
    fn from(err: regex::Error) -> Self {
        SnapSearchError::Configuration(format!("Invalid regular expression: {err}"))
    }
}

impl From<serde_json::Error> for SnapSearchError {
    fn from(err: serde_json::Error) -> Self {
        SnapSearchError::Configuration(format!("Invalid JSON data source: {err}"))
    }
}

impl IntoResponse for SnapSearchError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "SnapSearch interception failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

/// Result type for SnapSearch operations.
pub type Result<T> = std::result::Result<T, SnapSearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_message() {
        let err = SnapSearchError::Validation {
            messages: vec![
                ("url".to_string(), "The url field is required.".to_string()),
                ("width".to_string(), "Width must be numeric.".to_string()),
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("Validation error from SnapSearch."));
        assert!(text.contains("\n    The url field is required."));
        assert!(text.contains("\n    Width must be numeric."));
    }

    #[test]
    fn test_regex_error_is_configuration_error() {
        let err: SnapSearchError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, SnapSearchError::Configuration(_)));
        assert!(err.to_string().contains("Invalid regular expression"));
        assert!(!err.to_string().contains("route"));
    }

    #[test]
    fn test_error_into_response_is_server_error() {
        let response = SnapSearchError::Connection("refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
