// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

/// Both projections of a request URL after reversing the escaped-fragment scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedUrl {
    /// Decoded path used for route matching.
    pub decoded_path: String,
    /// Absolute URL sent to the rendering API.
    pub encoded_url: String,
}
