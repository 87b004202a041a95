// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use std::path::PathBuf;

/// Query parameter the AJAX crawling scheme uses to carry a `#!` fragment.
pub const ESCAPED_FRAGMENT_KEY: &str = "_escaped_fragment_";

/// Read-only projection of an inbound request, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFacts {
    /// Upper-case HTTP method, e.g. `GET`.
    pub method: String,
    /// Lower-case scheme, e.g. `https`.
    pub scheme: String,
    /// Host with optional port, as sent in the `Host` header.
    pub host: String,
    /// Raw (still percent-encoded) path.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    /// Decoded query pairs. Duplicate keys keep the first position and the last value.
    pub params: Vec<(String, String)>,
    pub user_agent: String,
    /// Root directory used when static files are checked on disk.
    pub document_root: Option<PathBuf>,
}

impl RequestFacts {
    /// Build facts from the individual request components.
    ///
    /// `target` is the request target as it appears on the request line
    /// (`/path?query`).
    pub fn new(
        method: impl Into<String>,
        scheme: impl Into<String>,
        host: impl Into<String>,
        target: &str,
        user_agent: impl Into<String>,
    ) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            method: method.into().to_ascii_uppercase(),
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into(),
            path: path.to_string(),
            query: query.to_string(),
            params: parse_query(query),
            user_agent: user_agent.into(),
            document_root: None,
        }
    }

    pub fn with_document_root(mut self, document_root: impl Into<PathBuf>) -> Self {
        self.document_root = Some(document_root.into());
        self
    }

    /// Look up a decoded query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_escaped_fragment(&self) -> bool {
        self.param(ESCAPED_FRAGMENT_KEY).is_some()
    }

    /// `scheme://host` without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// The full URL exactly as requested.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            format!("{}{}", self.base_url(), self.path)
        } else {
            format!("{}{}?{}", self.base_url(), self.path, self.query)
        }
    }
}

/// Split a query string into decoded pairs using form semantics (`+` is a space).
fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value.into_owned(),
            None => params.push((key.into_owned(), value.into_owned())),
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_form_decoded() {
        let facts = RequestFacts::new(
            "get",
            "HTTP",
            "localhost",
            "/snapsearch/path1?key%201=value+1&_escaped_fragment_=%2Fpath2%3Fkey2=value2",
            "Mozilla/5.0",
        );

        assert_eq!(facts.method, "GET");
        assert_eq!(facts.scheme, "http");
        assert_eq!(
            facts.params,
            vec![
                ("key 1".to_string(), "value 1".to_string()),
                (
                    ESCAPED_FRAGMENT_KEY.to_string(),
                    "/path2?key2=value2".to_string()
                ),
            ]
        );
        assert!(facts.has_escaped_fragment());
    }

    #[test]
    fn test_duplicate_keys_last_value_wins() {
        let facts = RequestFacts::new("GET", "http", "localhost", "/?a=1&b=2&a=3", "");
        assert_eq!(
            facts.params,
            vec![
                ("a".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_bare_escaped_fragment_key_is_present() {
        let facts = RequestFacts::new("GET", "http", "localhost", "/snapsearch?_escaped_fragment_", "");
        assert_eq!(facts.param(ESCAPED_FRAGMENT_KEY), Some(""));
    }

    #[test]
    fn test_url_round_trips_request_target() {
        let facts = RequestFacts::new("GET", "http", "localhost:8080", "/a%20b?x=1", "");
        assert_eq!(facts.url(), "http://localhost:8080/a%20b?x=1");

        let facts = RequestFacts::new("GET", "https", "example.com", "", "");
        assert_eq!(facts.url(), "https://example.com/");
    }
}
