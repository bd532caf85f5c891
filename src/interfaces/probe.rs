// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared deadline-based health-probe helpers. No "sleep-and-retry" busy
//! loops: a single attempt is made against the caller-supplied deadline,
//! using `tokio::time::timeout` so it is trivially cancellable by the
//! lifecycle controller aborting the enclosing task.

use std::time::{Duration, Instant};

use super::adapter::HealthOutcome;

fn remaining(started_at: Instant, timeout: Duration) -> Option<Duration> {
    timeout.checked_sub(started_at.elapsed())
}

/// Probes liveness only: a TCP connect to the backend's port.
pub async fn probe_tcp(port: u16, started_at: Instant, timeout: Duration) -> HealthOutcome {
    let Some(budget) = remaining(started_at, timeout) else {
        return HealthOutcome::fail("health timeout elapsed before probe");
    };

    let addr = format!("127.0.0.1:{port}");
    match tokio::time::timeout(budget, tokio::net::TcpStream::connect(&addr)).await {
        Ok(Ok(_)) => HealthOutcome::ok(),
        Ok(Err(e)) => HealthOutcome::fail(format!("connect to {addr} failed: {e}")),
        Err(_) => HealthOutcome::fail("connect timed out"),
    }
}

/// Probes liveness (TCP connect) then functionality: a minimal GET against
/// `path` expecting any non-5xx response, matching the "liveness +
/// minimal mode-appropriate request" requirement without assuming a
/// specific backend request body shape.
pub async fn probe_tcp_and_path(
    port: u16,
    started_at: Instant,
    timeout: Duration,
    path: &str,
) -> HealthOutcome {
    let tcp = probe_tcp(port, started_at, timeout).await;
    if !tcp.ok {
        return tcp;
    }

    let Some(budget) = remaining(started_at, timeout) else {
        return HealthOutcome::fail("health timeout elapsed before functional probe");
    };

    let client = match reqwest::Client::builder().timeout(budget).build() {
        Ok(c) => c,
        Err(e) => return HealthOutcome::fail(format!("could not build probe client: {e}")),
    };

    let url = format!("http://127.0.0.1:{port}/{path}");
    match client.get(&url).send().await {
        Ok(resp) if resp.status().as_u16() < 500 => HealthOutcome::ok(),
        Ok(resp) => HealthOutcome::fail(format!("backend returned {}", resp.status())),
        Err(e) if e.is_timeout() => HealthOutcome::fail("functional probe timed out"),
        Err(e) => HealthOutcome::fail(format!("functional probe failed: {e}")),
    }
}

/// Chat probe additionally posts a minimal chat-completions body so a
/// server that accepts connections but never initialised its model is
/// still caught.
pub async fn probe_chat_completion(port: u16, started_at: Instant, timeout: Duration) -> HealthOutcome {
    let tcp = probe_tcp(port, started_at, timeout).await;
    if !tcp.ok {
        return tcp;
    }

    let Some(budget) = remaining(started_at, timeout) else {
        return HealthOutcome::fail("health timeout elapsed before functional probe");
    };

    let client = match reqwest::Client::builder().timeout(budget).build() {
        Ok(c) => c,
        Err(e) => return HealthOutcome::fail(format!("could not build probe client: {e}")),
    };

    let url = format!("http://127.0.0.1:{port}/v1/chat/completions");
    let body = serde_json::json!({
        "model": "health-probe",
        "messages": [{"role": "user", "content": "ping"}],
        "max_tokens": 1,
    });

    match client.post(&url).json(&body).send().await {
        Ok(resp) if resp.status().as_u16() < 500 => HealthOutcome::ok(),
        Ok(resp) => HealthOutcome::fail(format!("backend returned {}", resp.status())),
        Err(e) if e.is_timeout() => HealthOutcome::fail("functional probe timed out"),
        Err(e) => HealthOutcome::fail(format!("functional probe failed: {e}")),
    }
}
