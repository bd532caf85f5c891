// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use super::adapter::{HealthOutcome, InterfaceAdapter, ValidationOutcome};
use super::probe::probe_tcp_and_path;

pub struct EmbeddingAdapter;

#[async_trait]
impl InterfaceAdapter for EmbeddingAdapter {
    fn mode(&self) -> &str {
        "embedding"
    }

    fn endpoints(&self) -> HashSet<&'static str> {
        HashSet::from(["v1/embeddings"])
    }

    async fn health(&self, port: u16, started_at: std::time::Instant, timeout: Duration) -> HealthOutcome {
        probe_tcp_and_path(port, started_at, timeout, "v1/embeddings").await
    }

    fn validate(&self, path: &str, _model_name: &str) -> ValidationOutcome {
        if path.trim_start_matches('/') == "v1/embeddings" {
            ValidationOutcome::ok()
        } else {
            ValidationOutcome::fail(format!("path {path} is not an embeddings endpoint"))
        }
    }
}
