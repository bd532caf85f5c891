// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `InterfaceAdapter` trait: one implementation per request mode
//! (chat, base completion, embedding, reranker, ...).

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HealthOutcome {
    pub ok: bool,
    pub reason: Option<String>,
}

impl HealthOutcome {
    pub fn ok() -> Self {
        Self { ok: true, reason: None }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self { ok: false, reason: Some(reason.into()) }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self { ok: true, reason: None }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self { ok: false, reason: Some(reason.into()) }
    }
}

#[async_trait]
pub trait InterfaceAdapter: Send + Sync {
    /// Mode tag this adapter serves, e.g. "chat".
    fn mode(&self) -> &str;

    /// Path prefixes this mode accepts, e.g. `{"v1/chat/completions"}`.
    fn endpoints(&self) -> HashSet<&'static str>;

    /// Probe liveness (socket accept) and functionality (a minimal
    /// mode-appropriate request) against the backend at `127.0.0.1:port`.
    /// Must respect `timeout` and never busy-loop.
    async fn health(&self, port: u16, started_at: std::time::Instant, timeout: Duration) -> HealthOutcome;

    /// Checks that `path` is one this mode serves for `model_name`.
    fn validate(&self, path: &str, model_name: &str) -> ValidationOutcome;
}
