// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod config;
pub mod outcome;
pub mod reconstructed_url;
pub mod request;
pub mod robots;
pub mod settings;
pub mod snapshot;
pub mod version;
