// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Robot detection.
//!
//! [`Classifier::detect`] runs a fixed cascade; the first rule that fires
//! decides the result:
//!
//! 1. only `GET` requests
//! 2. only `http` and `https`
//! 3. ignored user agents are never intercepted
//! 4. every matched route must match the decoded path
//! 5. no ignored route may match the decoded path
//! 6. static resources are skipped (extension table or file on disk)
//! 7. an `_escaped_fragment_` parameter is intercepted
//! 8. matched user agents are intercepted
//!
//! The agent tables and extension table can be replaced at runtime. Each
//! replacement swaps in a fresh immutable table, so a request never sees a
//! half-updated list.

use crate::error::{Result, SnapSearchError};
use crate::models::config::{ClassifierConfig, StaticCheck};
use crate::models::reconstructed_url::ReconstructedUrl;
use crate::models::request::RequestFacts;
use crate::models::robots::{FileExtensions, RobotAgents};
use crate::services::escaped_fragment::{decode_path, reconstruct_url};
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

/// Route lists that replace the configured ones for a single call.
#[derive(Debug, Clone, Default)]
pub struct RouteOverrides {
    pub matched_routes: Option<Vec<Regex>>,
    pub ignored_routes: Option<Vec<Regex>>,
}

impl RouteOverrides {
    pub fn matched(patterns: &[&str]) -> Result<Self> {
        Ok(Self {
            matched_routes: Some(compile_routes(patterns)?),
            ignored_routes: None,
        })
    }

    pub fn ignored(patterns: &[&str]) -> Result<Self> {
        Ok(Self {
            matched_routes: None,
            ignored_routes: Some(compile_routes(patterns)?),
        })
    }
}

/// Case-insensitive substring matcher compiled from an agent list.
#[derive(Debug)]
struct AgentMatcher {
    pattern: Option<Regex>,
}

impl AgentMatcher {
    fn new(agents: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = agents
            .iter()
            .filter(|agent| !agent.is_empty())
            .map(|agent| regex::escape(agent))
            .collect();

        // An empty alternation would match every agent.
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| SnapSearchError::configuration(format!("Invalid agent list: {e}")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    fn is_match(&self, user_agent: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(user_agent))
    }
}

/// Immutable agent table, swapped as a whole on update.
#[derive(Debug)]
struct AgentTable {
    source: RobotAgents,
    ignore: AgentMatcher,
    matched: AgentMatcher,
}

impl AgentTable {
    fn new(source: RobotAgents) -> Result<Self> {
        Ok(Self {
            ignore: AgentMatcher::new(&source.ignore)?,
            matched: AgentMatcher::new(&source.matched)?,
            source,
        })
    }
}

/// Decides whether a request comes from a search engine robot.
///
/// Shared across requests; detection only reads.
#[derive(Debug)]
pub struct Classifier {
    matched_routes: Vec<Regex>,
    ignored_routes: Vec<Regex>,
    static_check: StaticCheck,
    agents: RwLock<Arc<AgentTable>>,
    extensions: RwLock<Arc<FileExtensions>>,
}

impl Classifier {
    /// Compile the configuration. Invalid route patterns are rejected here so
    /// detection itself can never fail.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let matched: Vec<&str> = config.matched_routes.iter().map(String::as_str).collect();
        let ignored: Vec<&str> = config.ignored_routes.iter().map(String::as_str).collect();

        Ok(Self {
            matched_routes: compile_routes(&matched)?,
            ignored_routes: compile_routes(&ignored)?,
            static_check: config.static_check,
            agents: RwLock::new(Arc::new(AgentTable::new(config.robots)?)),
            extensions: RwLock::new(Arc::new(config.extensions)),
        })
    }

    /// Whether the request should be served a snapshot.
    pub fn detect(&self, facts: &RequestFacts) -> bool {
        self.detect_with(facts, &RouteOverrides::default())
    }

    /// Like [`Classifier::detect`], with per-call route lists.
    pub fn detect_with(&self, facts: &RequestFacts, overrides: &RouteOverrides) -> bool {
        let url = reconstruct_url(facts);
        self.detect_reconstructed(facts, &url, overrides)
    }

    /// Run the cascade against an already reconstructed URL.
    pub fn detect_reconstructed(
        &self,
        facts: &RequestFacts,
        url: &ReconstructedUrl,
        overrides: &RouteOverrides,
    ) -> bool {
        let (intercept, reason) = self.evaluate(facts, url, overrides);
        tracing::debug!(
            path = %url.decoded_path,
            user_agent = %facts.user_agent,
            intercept,
            reason,
            "Robot detection finished"
        );
        intercept
    }

    fn evaluate(
        &self,
        facts: &RequestFacts,
        url: &ReconstructedUrl,
        overrides: &RouteOverrides,
    ) -> (bool, &'static str) {
        if facts.method != "GET" {
            return (false, "method is not GET");
        }

        if facts.scheme != "http" && facts.scheme != "https" {
            return (false, "scheme is not http or https");
        }

        let agents = self.agents.read().clone();
        if agents.ignore.is_match(&facts.user_agent) {
            return (false, "ignored user agent");
        }

        let real_path = url.decoded_path.as_str();

        let matched = overrides
            .matched_routes
            .as_deref()
            .unwrap_or(&self.matched_routes);
        if !matched.iter().all(|route| route.is_match(real_path)) {
            return (false, "path misses a matched route");
        }

        let ignored = overrides
            .ignored_routes
            .as_deref()
            .unwrap_or(&self.ignored_routes);
        if ignored.iter().any(|route| route.is_match(real_path)) {
            return (false, "path hits an ignored route");
        }

        if self.is_static_resource(facts) {
            return (false, "static resource");
        }

        if facts.has_escaped_fragment() {
            return (true, "escaped fragment");
        }

        if agents.matched.is_match(&facts.user_agent) {
            return (true, "matched user agent");
        }

        (false, "no robot signature")
    }

    // Uses the request path alone, so an encoded `?` or `#` stays part of the file name.
    fn is_static_resource(&self, facts: &RequestFacts) -> bool {
        match self.static_check {
            StaticCheck::Disabled => false,
            StaticCheck::FileExtensions => match file_extension(&decode_path(&facts.path)) {
                Some(extension) => !self.extensions.read().allows(&extension),
                None => false,
            },
            StaticCheck::StaticFiles => match &facts.document_root {
                Some(root) => is_static_file(root, &decode_path(&facts.path)),
                None => false,
            },
        }
    }

    /// The agent lists currently in use.
    pub fn robots(&self) -> RobotAgents {
        self.agents.read().source.clone()
    }

    /// Replace both agent lists.
    pub fn set_robots(&self, robots: RobotAgents) -> Result<()> {
        let table = Arc::new(AgentTable::new(robots)?);
        *self.agents.write() = table;
        Ok(())
    }

    /// Replace the ignored agents only.
    pub fn set_ignore_robots(&self, agents: Vec<String>) -> Result<()> {
        self.update_robots(|robots| robots.ignore = agents)
    }

    /// Replace the matched agents only.
    pub fn set_match_robots(&self, agents: Vec<String>) -> Result<()> {
        self.update_robots(|robots| robots.matched = agents)
    }

    pub fn add_match_robots<I, S>(&self, agents: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_robots(|robots| robots.matched.extend(agents.into_iter().map(Into::into)))
    }

    pub fn add_ignore_robots<I, S>(&self, agents: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_robots(|robots| robots.ignore.extend(agents.into_iter().map(Into::into)))
    }

    /// Re-read the agent lists from a JSON file. On failure the current lists stay.
    pub fn reload_robots_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let robots = RobotAgents::from_json_file(path.as_ref())?;
        self.set_robots(robots)?;
        tracing::info!(path = %path.as_ref().display(), "Reloaded robot agent lists");
        Ok(())
    }

    pub fn extensions(&self) -> FileExtensions {
        self.extensions.read().as_ref().clone()
    }

    pub fn set_extensions(&self, extensions: FileExtensions) {
        *self.extensions.write() = Arc::new(extensions);
    }

    // The write lock is held across read-modify-write so concurrent additions are not lost.
    fn update_robots(&self, change: impl FnOnce(&mut RobotAgents)) -> Result<()> {
        let mut guard = self.agents.write();
        let mut robots = guard.source.clone();
        change(&mut robots);
        *guard = Arc::new(AgentTable::new(robots)?);
        Ok(())
    }
}

fn compile_routes(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| {
                SnapSearchError::configuration(format!("Invalid route pattern '{pattern}': {e}"))
            })
        })
        .collect()
}

/// Lower-cased extension of the last path segment, if it has one.
pub fn file_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, extension) = segment.rsplit_once('.')?;
    let extension = extension.trim();
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Whether `path` names an existing non-PHP file under `document_root`.
fn is_static_file(document_root: &Path, path: &str) -> bool {
    let root = normalize_separators(&document_root.to_string_lossy());
    let relative = normalize_separators(path);
    let relative = relative.trim_start_matches(MAIN_SEPARATOR);

    if root.is_empty() || relative.is_empty() {
        return false;
    }

    // `join` handles a trailing separator on the root, including a root of `/`.
    let absolute = PathBuf::from(root).join(relative);
    if !absolute.is_file() {
        return false;
    }

    let is_php = absolute
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("php"));
    !is_php
}

fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect()
}
