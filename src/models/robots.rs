// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! User agent and file extension data sources.
//!
//! Both tables ship as JSON files under `data/` and are embedded at compile
//! time. Callers may load their own copies from disk instead.

use crate::error::{Result, SnapSearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_ROBOTS_JSON: &str = include_str!("../../data/robots.json");
const DEFAULT_EXTENSIONS_JSON: &str = include_str!("../../data/extensions.json");

/// User agent substrings that force or forbid interception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotAgents {
    /// Agents that are always served the origin response, e.g. the renderer itself.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Agents recognised as search engine robots.
    #[serde(default, rename = "match")]
    pub matched: Vec<String>,
}

impl RobotAgents {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read_source(path.as_ref())?)
    }
}

impl Default for RobotAgents {
    fn default() -> Self {
        // The embedded file is covered by tests.
        serde_json::from_str(DEFAULT_ROBOTS_JSON).unwrap_or(Self {
            ignore: Vec::new(),
            matched: Vec::new(),
        })
    }
}

/// File extensions that are still served through the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileExtensions {
    #[serde(default)]
    pub generic: Vec<String>,
    #[serde(default)]
    pub php: Vec<String>,
}

impl FileExtensions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&read_source(path.as_ref())?)
    }

    /// Whether `extension` appears in either list, ignoring case and surrounding whitespace.
    pub fn allows(&self, extension: &str) -> bool {
        let extension = extension.trim();
        self.generic
            .iter()
            .chain(self.php.iter())
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(extension))
    }
}

impl Default for FileExtensions {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_EXTENSIONS_JSON).unwrap_or(Self {
            generic: Vec::new(),
            php: Vec::new(),
        })
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        SnapSearchError::configuration(format!("Failed to read {}: {e}", path.display()))
    })
}
