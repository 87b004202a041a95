// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Reverses the AJAX crawling scheme.
//!
//! A robot requesting `http://example.com/path#!key=value` actually asks for
//! `http://example.com/path?_escaped_fragment_=key%3Dvalue`. The renderer has
//! to load the original hash-bang URL, and route matching should see the
//! path the application would have seen in a browser.

use crate::models::reconstructed_url::ReconstructedUrl;
use crate::models::request::{RequestFacts, ESCAPED_FRAGMENT_KEY};
use percent_encoding::percent_decode_str;
use url::form_urlencoded::byte_serialize;

/// Build the decoded path and the encoded URL for a request.
pub fn reconstruct_url(facts: &RequestFacts) -> ReconstructedUrl {
    let Some(fragment) = facts.param(ESCAPED_FRAGMENT_KEY) else {
        return ReconstructedUrl {
            decoded_path: decode_path(&facts.path),
            encoded_url: facts.url(),
        };
    };

    let hash = format!("#!{fragment}");
    let remaining: Vec<&(String, String)> = facts
        .params
        .iter()
        .filter(|(key, _)| key != ESCAPED_FRAGMENT_KEY)
        .collect();

    ReconstructedUrl {
        decoded_path: format!(
            "{}{}{}",
            decode_path(&facts.path),
            query_string(&remaining, false),
            hash
        ),
        encoded_url: format!(
            "{}{}{}{}",
            facts.base_url(),
            facts.path,
            query_string(&remaining, true),
            hash
        ),
    }
}

/// Percent-decode a path. `+` is kept, it only means a space in query strings.
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

fn query_string(pairs: &[&(String, String)], encode: bool) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let joined = pairs
        .iter()
        .map(|(key, value)| {
            if encode {
                format!("{}={}", form_encode(key), form_encode(value))
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("?{joined}")
}

fn form_encode(input: &str) -> String {
    byte_serialize(input.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(host: &str, target: &str) -> RequestFacts {
        RequestFacts::new("GET", "http", host, target, "Mozilla/5.0")
    }

    #[test]
    fn test_escaped_fragment_becomes_hash_bang() {
        let url = reconstruct_url(&facts(
            "localhost",
            "/snapsearch/path1?key1=value1&_escaped_fragment_=%2Fpath2%3Fkey2=value2",
        ));

        assert_eq!(
            url.encoded_url,
            "http://localhost/snapsearch/path1?key1=value1#!/path2?key2=value2"
        );
        assert_eq!(
            url.decoded_path,
            "/snapsearch/path1?key1=value1#!/path2?key2=value2"
        );
    }

    #[test]
    fn test_remaining_params_are_reencoded_only_in_encoded_url() {
        let url = reconstruct_url(&facts(
            "localhost",
            "/shop?key%201=value+1&_escaped_fragment_=item",
        ));

        assert_eq!(url.encoded_url, "http://localhost/shop?key+1=value+1#!item");
        assert_eq!(url.decoded_path, "/shop?key 1=value 1#!item");
    }

    #[test]
    fn test_only_fragment_param_drops_query() {
        let url = reconstruct_url(&facts("localhost", "/snapsearch?_escaped_fragment_"));
        assert_eq!(url.encoded_url, "http://localhost/snapsearch#!");
        assert_eq!(url.decoded_path, "/snapsearch#!");
    }

    #[test]
    fn test_without_fragment_decodes_path_only() {
        let url = reconstruct_url(&facts(
            "localhost:8080",
            "/some%20path/another+path/path1.htm?key1=value%201",
        ));

        assert_eq!(url.decoded_path, "/some path/another+path/path1.htm");
        assert_eq!(
            url.encoded_url,
            "http://localhost:8080/some%20path/another+path/path1.htm?key1=value%201"
        );
    }

    #[test]
    fn test_reconstruction_is_deterministic() {
        let request = facts("localhost", "/a?_escaped_fragment_=x&b=c");
        assert_eq!(reconstruct_url(&request), reconstruct_url(&request));
    }
}
