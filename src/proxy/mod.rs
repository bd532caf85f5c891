// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Routing Proxy: resolves a request to a model, starts it if necessary,
//! forwards it transparently, and records usage once the exchange
//! completes.

pub mod forward;
pub mod router;
pub mod usage;

pub use forward::ForwardedResponse;
pub use usage::Usage;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, Method};
use bytes::Bytes;

use crate::accounting::{AccountingStore, RequestRecord};
use crate::config::ConfigStore;
use crate::error::GatewayError;
use crate::interfaces::InterfaceRegistry;
use crate::lifecycle::ModelLifecycleController;

pub struct RoutingProxy {
    config: Arc<ConfigStore>,
    interfaces: Arc<InterfaceRegistry>,
    lifecycle: Arc<ModelLifecycleController>,
    accounting: Arc<AccountingStore>,
    client: reqwest::Client,
}

impl RoutingProxy {
    pub fn new(
        config: Arc<ConfigStore>,
        interfaces: Arc<InterfaceRegistry>,
        lifecycle: Arc<ModelLifecycleController>,
        accounting: Arc<AccountingStore>,
    ) -> Self {
        Self {
            config,
            interfaces,
            lifecycle,
            accounting,
            client: reqwest::Client::new(),
        }
    }

    pub async fn route(
        &self,
        model_name: &str,
        path: &str,
        method: Method,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<ForwardedResponse, GatewayError> {
        let target = router::resolve(&self.config, &self.interfaces, model_name, path)?;
        let port = self.lifecycle.ensure_running(&target.canonical).await?;
        debug_assert_eq!(port, target.port);

        self.lifecycle.request_started(&target.canonical);

        let forwarded = match forward::forward(&self.client, target.port, path, method, headers, body).await {
            Ok(f) => f,
            Err(e) => {
                self.lifecycle.request_finished(&target.canonical);
                return Err(e);
            }
        };

        let canonical = target.canonical.clone();
        let lifecycle = self.lifecycle.clone();
        let accounting = self.accounting.clone();
        let usage_rx = forwarded.usage_rx;
        tokio::spawn(async move {
            let usage = usage_rx.await.unwrap_or_default();
            lifecycle.request_finished(&canonical);
            let record = RequestRecord {
                ts: now_secs(),
                in_tok: usage.prompt_tokens,
                out_tok: usage.completion_tokens,
                cache_n: usage.cache_n.unwrap_or(usage.cached_tokens),
                prompt_n: usage
                    .prompt_n
                    .unwrap_or_else(|| usage.prompt_tokens.saturating_sub(usage.cached_tokens)),
            };
            let _ = tokio::task::spawn_blocking(move || accounting.record_request(&canonical, record)).await;
        });

        Ok(forwarded)
    }
}

fn now_secs() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}
