// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};

/// One header of the rendered page, as reported by the rendering API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub name: String,
    pub value: String,
}

/// The `content` payload of a successful render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContent {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<SnapshotHeader>,
    #[serde(default)]
    pub html: String,
    /// Base64 screenshot, only present when requested through the extra parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Render timestamp reported by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<serde_json::Value>,
}

impl SnapshotContent {
    pub fn new(status: u16, html: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            html: html.into(),
            screenshot: None,
            date: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(SnapshotHeader {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Outcome of a single render request.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotResult {
    Success(SnapshotContent),
    /// Field name to message pairs reported by the API.
    ValidationFailure(Vec<(String, String)>),
    /// The API failed on its side; callers serve the origin response.
    SystemFailure,
    /// Transport failure reaching the API.
    ConnectionFailure(String),
}
