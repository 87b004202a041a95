// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

/// Status, headers and body of a response about to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// What the middleware does with the origin response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptionOutcome {
    /// Serve the application response untouched.
    PassThrough,
    /// Replace status and body, and set the listed headers.
    Override(ResponseParts),
}

impl InterceptionOutcome {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, InterceptionOutcome::PassThrough)
    }
}
