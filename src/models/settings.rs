// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Process configuration read from the environment by the demo server.

use crate::models::config::{ClassifierConfig, ClientConfig, StaticCheck, DEFAULT_API_URL};
use crate::models::robots::{FileExtensions, RobotAgents};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// Everything needed to assemble the middleware.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub classifier: ClassifierConfig,
    pub document_root: Option<PathBuf>,
    pub x_forwarded_proto: bool,
}

impl Settings {
    /// Load settings from `SNAPSEARCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let email = lookup("SNAPSEARCH_EMAIL").context("SNAPSEARCH_EMAIL must be set")?;
        let key = lookup("SNAPSEARCH_KEY").context("SNAPSEARCH_KEY must be set")?;

        let mut client = ClientConfig::new(email, key).with_api_url(
            lookup("SNAPSEARCH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        );
        if let Some(path) = lookup("SNAPSEARCH_CA_CERT_FILE") {
            client = client.with_ca_cert_file(path);
        }
        if let Some(parameters) = lookup("SNAPSEARCH_PARAMETERS") {
            client.parameters = serde_json::from_str(&parameters)
                .context("SNAPSEARCH_PARAMETERS must be a JSON object")?;
        }

        let robots = match lookup("SNAPSEARCH_ROBOTS_JSON") {
            Some(path) => RobotAgents::from_json_file(&path)
                .with_context(|| format!("Failed to load robots from {path}"))?,
            None => RobotAgents::default(),
        };
        let extensions = match lookup("SNAPSEARCH_EXTENSIONS_JSON") {
            Some(path) => FileExtensions::from_json_file(&path)
                .with_context(|| format!("Failed to load extensions from {path}"))?,
            None => FileExtensions::default(),
        };

        let check_file_extensions = flag(&lookup, "SNAPSEARCH_CHECK_FILE_EXTENSIONS")?;
        let check_static_files = flag(&lookup, "SNAPSEARCH_CHECK_STATIC_FILES")?;
        let static_check = match (check_file_extensions, check_static_files) {
            (true, true) => bail!(
                "SNAPSEARCH_CHECK_FILE_EXTENSIONS and SNAPSEARCH_CHECK_STATIC_FILES are mutually exclusive"
            ),
            (true, false) => StaticCheck::FileExtensions,
            (false, true) => StaticCheck::StaticFiles,
            (false, false) => StaticCheck::Disabled,
        };

        let document_root = lookup("SNAPSEARCH_DOCUMENT_ROOT").map(PathBuf::from);
        if static_check == StaticCheck::StaticFiles && document_root.is_none() {
            bail!("SNAPSEARCH_CHECK_STATIC_FILES requires SNAPSEARCH_DOCUMENT_ROOT");
        }

        let classifier = ClassifierConfig {
            matched_routes: list(&lookup, "SNAPSEARCH_MATCHED_ROUTES"),
            ignored_routes: list(&lookup, "SNAPSEARCH_IGNORED_ROUTES"),
            robots,
            extensions,
            static_check,
        };

        Ok(Self {
            client,
            classifier,
            document_root,
            x_forwarded_proto: flag(&lookup, "SNAPSEARCH_X_FORWARDED_PROTO")?,
        })
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<bool> {
    match lookup(name).as_deref() {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => bail!("{name} must be 'true' or 'false', got: {other}"),
    }
}

/// Comma-separated list; empty entries are dropped.
fn list(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Vec<String> {
    lookup(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
