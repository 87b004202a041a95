// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod classifier;
pub mod client;
pub mod escaped_fragment;
pub mod interceptor;
pub mod logging;
pub mod middleware;
