// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use super::adapter::{HealthOutcome, InterfaceAdapter, ValidationOutcome};
use super::probe::probe_chat_completion;

pub struct ChatAdapter;

#[async_trait]
impl InterfaceAdapter for ChatAdapter {
    fn mode(&self) -> &str {
        "chat"
    }

    fn endpoints(&self) -> HashSet<&'static str> {
        HashSet::from(["v1/chat/completions"])
    }

    async fn health(&self, port: u16, started_at: std::time::Instant, timeout: Duration) -> HealthOutcome {
        probe_chat_completion(port, started_at, timeout).await
    }

    fn validate(&self, path: &str, _model_name: &str) -> ValidationOutcome {
        if path.trim_start_matches('/') == "v1/chat/completions" {
            ValidationOutcome::ok()
        } else {
            ValidationOutcome::fail(format!("path {path} is not a chat endpoint"))
        }
    }
}
