// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-request orchestration of detection, hooks and snapshot retrieval.
//!
//! Order of a single interception:
//!
//! 1. reconstruct the URL once
//! 2. `before_intercept(url)`; a returned snapshot short-circuits detection and fetch
//! 3. detect; a human visitor passes through
//! 4. fetch; connection and validation failures become errors, a system
//!    failure passes through
//! 5. `after_intercept(url, result)` observes the fetched result
//! 6. assemble the override and pass it through `response_rewrite`
//!
//! Errors go to `on_exception` when registered (the request then passes
//! through); otherwise they are returned to the caller.

use crate::error::{Result, SnapSearchError};
use crate::models::outcome::{InterceptionOutcome, ResponseParts};
use crate::models::request::RequestFacts;
use crate::models::snapshot::{SnapshotContent, SnapshotResult};
use crate::services::classifier::{Classifier, RouteOverrides};
use crate::services::client::SnapshotFetcher;
use crate::services::escaped_fragment::reconstruct_url;
use std::future::Future;
use std::sync::Arc;

pub type BeforeInterceptHook = Arc<dyn Fn(&str) -> Option<SnapshotContent> + Send + Sync>;
pub type AfterInterceptHook = Arc<dyn Fn(&str, &SnapshotResult) + Send + Sync>;
pub type ResponseRewriteHook = Arc<dyn Fn(ResponseParts) -> ResponseParts + Send + Sync>;
pub type ExceptionHook = Arc<dyn Fn(&SnapSearchError) + Send + Sync>;

/// Optional callbacks around an interception.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_intercept: Option<BeforeInterceptHook>,
    pub after_intercept: Option<AfterInterceptHook>,
    pub response_rewrite: Option<ResponseRewriteHook>,
    pub on_exception: Option<ExceptionHook>,
}

impl Hooks {
    pub fn before_intercept(
        mut self,
        hook: impl Fn(&str) -> Option<SnapshotContent> + Send + Sync + 'static,
    ) -> Self {
        self.before_intercept = Some(Arc::new(hook));
        self
    }

    pub fn after_intercept(
        mut self,
        hook: impl Fn(&str, &SnapshotResult) + Send + Sync + 'static,
    ) -> Self {
        self.after_intercept = Some(Arc::new(hook));
        self
    }

    pub fn response_rewrite(
        mut self,
        hook: impl Fn(ResponseParts) -> ResponseParts + Send + Sync + 'static,
    ) -> Self {
        self.response_rewrite = Some(Arc::new(hook));
        self
    }

    pub fn on_exception(mut self, hook: impl Fn(&SnapSearchError) + Send + Sync + 'static) -> Self {
        self.on_exception = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_intercept", &self.before_intercept.is_some())
            .field("after_intercept", &self.after_intercept.is_some())
            .field("response_rewrite", &self.response_rewrite.is_some())
            .field("on_exception", &self.on_exception.is_some())
            .finish()
    }
}

/// Entry point used by the HTTP middleware.
pub struct Interceptor {
    classifier: Arc<Classifier>,
    client: Arc<dyn SnapshotFetcher>,
    hooks: Hooks,
}

impl Interceptor {
    pub fn new(classifier: Arc<Classifier>, client: Arc<dyn SnapshotFetcher>) -> Self {
        Self {
            classifier,
            client,
            hooks: Hooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    /// Decide how to answer `facts`.
    pub async fn intercept(&self, facts: &RequestFacts) -> Result<InterceptionOutcome> {
        self.intercept_with(facts, &RouteOverrides::default()).await
    }

    /// Like [`Interceptor::intercept`], with per-call route lists.
    pub async fn intercept_with(
        &self,
        facts: &RequestFacts,
        overrides: &RouteOverrides,
    ) -> Result<InterceptionOutcome> {
        match self.run(facts, overrides).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => self.route_error(err),
        }
    }

    /// Like [`Interceptor::intercept`], abandoning the fetch once `cancelled`
    /// resolves. Cancellation counts as a connection failure.
    pub async fn intercept_or_cancel<C>(
        &self,
        facts: &RequestFacts,
        cancelled: C,
    ) -> Result<InterceptionOutcome>
    where
        C: Future<Output = ()>,
    {
        let overrides = RouteOverrides::default();
        tokio::select! {
            outcome = self.run(facts, &overrides) => match outcome {
                Ok(outcome) => Ok(outcome),
                Err(err) => self.route_error(err),
            },
            () = cancelled => {
                self.route_error(SnapSearchError::Connection("request cancelled".to_string()))
            }
        }
    }

    async fn run(
        &self,
        facts: &RequestFacts,
        overrides: &RouteOverrides,
    ) -> Result<InterceptionOutcome> {
        let url = reconstruct_url(facts);

        if let Some(before) = &self.hooks.before_intercept {
            if let Some(content) = before(&url.encoded_url) {
                tracing::debug!(url = %url.encoded_url, "before_intercept supplied the response");
                return Ok(self.assemble(content));
            }
        }

        if !self.classifier.detect_reconstructed(facts, &url, overrides) {
            return Ok(InterceptionOutcome::PassThrough);
        }

        let result = match self.client.fetch(&url.encoded_url).await {
            SnapshotResult::ConnectionFailure(reason) => {
                return Err(SnapSearchError::Connection(reason));
            }
            SnapshotResult::ValidationFailure(messages) => {
                return Err(SnapSearchError::Validation { messages });
            }
            result => result,
        };

        if let Some(after) = &self.hooks.after_intercept {
            after(&url.encoded_url, &result);
        }

        match result {
            SnapshotResult::Success(content) => {
                tracing::info!(
                    url = %url.encoded_url,
                    status = content.status,
                    user_agent = %facts.user_agent,
                    "Serving snapshot to robot"
                );
                Ok(self.assemble(content))
            }
            _ => {
                tracing::warn!(url = %url.encoded_url, "No snapshot available, serving origin response");
                Ok(InterceptionOutcome::PassThrough)
            }
        }
    }

    fn assemble(&self, content: SnapshotContent) -> InterceptionOutcome {
        let mut headers = Vec::new();
        if let Some(location) = content.header("Location") {
            headers.push(("Location".to_string(), location.to_string()));
        }

        let parts = ResponseParts {
            status: content.status,
            headers,
            body: content.html,
        };

        let parts = match &self.hooks.response_rewrite {
            Some(rewrite) => rewrite(parts),
            None => parts,
        };
        InterceptionOutcome::Override(parts)
    }

    fn route_error(&self, err: SnapSearchError) -> Result<InterceptionOutcome> {
        match &self.hooks.on_exception {
            Some(handler) => {
                tracing::error!(error = %err, "SnapSearch error passed to exception handler");
                handler(&err);
                Ok(InterceptionOutcome::PassThrough)
            }
            None => Err(err),
        }
    }
}
