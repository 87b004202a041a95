// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Typed configuration for the classifier and the snapshot client.

use crate::models::robots::{FileExtensions, RobotAgents};
use std::path::PathBuf;
use std::time::Duration;

/// Public rendering endpoint used when no `api_url` is configured.
pub const DEFAULT_API_URL: &str = "https://snapsearch.io/api/v1/robot";

/// Connect and response timeout for calls to the rendering API.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the rendering API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub email: String,
    pub key: String,
    pub api_url: String,
    /// PEM bundle trusted in addition to the system roots.
    pub ca_cert_file: Option<PathBuf>,
    /// Extra fields merged into every request body.
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(email: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            key: key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            ca_cert_file: None,
            parameters: serde_json::Map::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_ca_cert_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_file = Some(path.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Which static-resource check runs before agent detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StaticCheck {
    #[default]
    Disabled,
    /// Skip paths whose extension is missing from the extension table.
    FileExtensions,
    /// Skip paths that exist on disk under the request's document root,
    /// except PHP scripts.
    StaticFiles,
}

/// Settings for the robot classifier.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Regex sources; every one must match the decoded path.
    pub matched_routes: Vec<String>,
    /// Regex sources; any match excludes the request.
    pub ignored_routes: Vec<String>,
    pub robots: RobotAgents,
    pub extensions: FileExtensions,
    pub static_check: StaticCheck,
}

impl ClassifierConfig {
    pub fn with_matched_route(mut self, pattern: impl Into<String>) -> Self {
        self.matched_routes.push(pattern.into());
        self
    }

    pub fn with_ignored_route(mut self, pattern: impl Into<String>) -> Self {
        self.ignored_routes.push(pattern.into());
        self
    }

    pub fn with_robots(mut self, robots: RobotAgents) -> Self {
        self.robots = robots;
        self
    }

    pub fn with_extensions(mut self, extensions: FileExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_static_check(mut self, static_check: StaticCheck) -> Self {
        self.static_check = static_check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("user@example.com", "secret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.ca_cert_file.is_none());
        assert!(config.parameters.is_empty());
    }

    #[test]
    fn test_classifier_config_defaults_use_embedded_tables() {
        let config = ClassifierConfig::default();
        assert!(config.matched_routes.is_empty());
        assert_eq!(config.static_check, StaticCheck::Disabled);
        assert!(!config.robots.matched.is_empty());
        assert!(config.extensions.allows("html"));
    }
}
