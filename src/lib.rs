// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Serve pre-rendered snapshots to search engine robots.
//!
//! The [`services::classifier::Classifier`] decides whether a request comes
//! from a robot, the [`services::client::SnapshotClient`] asks the rendering
//! API for a snapshot, and the [`services::interceptor::Interceptor`] ties the
//! two together. [`services::middleware`] plugs the interceptor into axum.

pub mod app;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Result, SnapSearchError};
