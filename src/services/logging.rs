// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Helpers that keep API credentials out of log output.

/// Mask an account email, keeping the first character and the domain:
/// "a***@example.com".
pub fn anonymize_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{first}***@{domain}"),
            None => format!("***@{domain}"),
        },
        None => "***@***".to_string(),
    }
}

/// Mask an API key, keeping at most its last four characters.
pub fn anonymize_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 8 {
        return "***".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("***{tail}")
}
