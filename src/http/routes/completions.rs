// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Catch-all forwarding for every `/v1/*` OpenAI-compatible endpoint.
//! The model to route to is read from the JSON body's `model` field, per
//! the OpenAI request shape every one of these endpoints shares.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;
use crate::http::state::AppState;

pub async fn forward(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let model_name = extract_model_name(&body)?;
    let path = format!("v1/{rest}");

    let forwarded = state.proxy.route(&model_name, &path, method, headers, body).await?;

    let mut response = Response::builder().status(forwarded.status);
    *response.headers_mut().unwrap() = forwarded.headers;
    Ok(response.body(forwarded.body).unwrap().into_response())
}

fn extract_model_name(body: &Bytes) -> Result<String, GatewayError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| GatewayError::BadRequest(format!("invalid JSON body: {e}")))?;
    value
        .get("model")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::BadRequest("request body is missing a \"model\" field".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_model_name_from_body() {
        let body = Bytes::from_static(br#"{"model": "llama-3-8b", "messages": []}"#);
        assert_eq!(extract_model_name(&body).unwrap(), "llama-3-8b");
    }

    #[test]
    fn missing_model_field_is_bad_request() {
        let body = Bytes::from_static(br#"{"messages": []}"#);
        assert!(matches!(extract_model_name(&body), Err(GatewayError::BadRequest(_))));
    }
}
