// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transparent forwarding to a backend's loopback port. Bodies are passed
//! through byte-for-byte; only a side channel extracts token usage for
//! accounting, which never blocks or reshapes what the client receives.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use futures::Stream;
use reqwest::Client;

use crate::error::GatewayError;

use super::usage::{from_json_body, from_sse_text, Usage};

pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
    pub usage_rx: tokio::sync::oneshot::Receiver<Usage>,
}

const HOP_BY_HOP: &[&str] = &["host", "content-length", "connection", "transfer-encoding"];

pub async fn forward(
    client: &Client,
    port: u16,
    path: &str,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ForwardedResponse, GatewayError> {
    let url = format!("http://127.0.0.1:{port}/{}", path.trim_start_matches('/'));

    let mut req = client.request(method, &url);
    for (name, value) in headers.iter() {
        if HOP_BY_HOP.contains(&name.as_str().to_ascii_lowercase().as_str()) {
            continue;
        }
        req = req.header(name, value);
    }
    let resp = req
        .body(body)
        .send()
        .await
        .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;

    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let is_event_stream = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/event-stream"))
        .unwrap_or(false);

    let mut out_headers = HeaderMap::new();
    for (name, value) in resp.headers().iter() {
        if HOP_BY_HOP.contains(&name.as_str().to_ascii_lowercase().as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            axum::http::HeaderName::from_bytes(name.as_str().as_bytes()),
            axum::http::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out_headers.insert(name, value);
        }
    }

    let (usage_tx, usage_rx) = tokio::sync::oneshot::channel();

    if is_event_stream {
        let tee = UsageTee {
            inner: Box::pin(resp.bytes_stream()),
            buffer: Vec::new(),
            sender: Some(usage_tx),
        };
        let body = Body::from_stream(tee);
        Ok(ForwardedResponse { status, headers: out_headers, body, usage_rx })
    } else {
        let bytes = resp.bytes().await.map_err(|e| GatewayError::BackendError(e.to_string()))?;
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            let _ = usage_tx.send(from_json_body(&value));
        } else {
            let _ = usage_tx.send(Usage::default());
        }
        Ok(ForwardedResponse { status, headers: out_headers, body: Body::from(bytes), usage_rx })
    }
}

struct UsageTee {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: Vec<u8>,
    sender: Option<tokio::sync::oneshot::Sender<Usage>>,
}

impl Stream for UsageTee {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.buffer.extend_from_slice(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(std::io::Error::new(std::io::ErrorKind::Other, e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for UsageTee {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let text = String::from_utf8_lossy(&self.buffer);
            let _ = sender.send(from_sse_text(&text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_by_hop_headers_are_filtered() {
        assert!(HOP_BY_HOP.contains(&"host"));
        assert!(!HOP_BY_HOP.contains(&"authorization"));
    }
}
