// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Token usage extraction. Tolerant of whatever shape a backend actually
//! returns: missing or malformed usage fields resolve to zero rather than
//! failing the request, since accounting must never block routing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cached_tokens: u64,
    /// Literal `cache_n` field, when a backend names it directly rather
    /// than nesting it under an OpenAI-shaped `prompt_tokens_details`.
    pub cache_n: Option<u64>,
    /// Literal `prompt_n` field, when a backend names it directly instead
    /// of leaving the caller to derive it from `prompt_tokens`.
    pub prompt_n: Option<u64>,
}

/// Pulls `usage` out of a parsed non-streaming JSON response body.
pub fn from_json_body(body: &Value) -> Usage {
    let Some(usage) = body.get("usage") else {
        return Usage::default();
    };
    usage_from_value(usage)
}

/// Scans raw SSE text for the last `data:` frame carrying a `usage` object
/// (OpenAI-compatible backends emit this on the final chunk when the
/// client requested `stream_options.include_usage`).
pub fn from_sse_text(text: &str) -> Usage {
    text.lines()
        .rev()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|payload| *payload != "[DONE]" && !payload.is_empty())
        .filter_map(|payload| serde_json::from_str::<Value>(payload).ok())
        .find_map(|frame| frame.get("usage").map(usage_from_value))
        .unwrap_or_default()
}

fn usage_from_value(usage: &Value) -> Usage {
    let prompt_tokens = usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0);
    let completion_tokens = usage.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0);
    let cached_tokens = usage
        .get("prompt_tokens_details")
        .and_then(|d| d.get("cached_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    // Backends that speak the gateway's own accounting vocabulary name
    // these fields directly; prefer them over anything derived.
    let cache_n = usage.get("cache_n").and_then(Value::as_u64);
    let prompt_n = usage.get("prompt_n").and_then(Value::as_u64);
    Usage { prompt_tokens, completion_tokens, cached_tokens, cache_n, prompt_n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_usage_from_json_body() {
        let body = json!({"usage": {"prompt_tokens": 10, "completion_tokens": 5}});
        let usage = from_json_body(&body);
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 5);
    }

    #[test]
    fn missing_usage_field_is_zero() {
        let body = json!({"choices": []});
        assert_eq!(from_json_body(&body).prompt_tokens, 0);
    }

    #[test]
    fn extracts_cached_tokens_detail() {
        let body = json!({"usage": {"prompt_tokens": 10, "completion_tokens": 5, "prompt_tokens_details": {"cached_tokens": 4}}});
        assert_eq!(from_json_body(&body).cached_tokens, 4);
    }

    #[test]
    fn finds_usage_in_final_sse_frame() {
        let text = "data: {\"choices\": []}\n\ndata: {\"usage\": {\"prompt_tokens\": 3, \"completion_tokens\": 2}}\n\ndata: [DONE]\n\n";
        let usage = from_sse_text(text);
        assert_eq!(usage.prompt_tokens, 3);
        assert_eq!(usage.completion_tokens, 2);
    }

    #[test]
    fn sse_text_without_usage_is_zero() {
        let text = "data: {\"choices\": []}\n\ndata: [DONE]\n\n";
        assert_eq!(from_sse_text(text).prompt_tokens, 0);
    }

    #[test]
    fn extracts_literal_cache_n_and_prompt_n() {
        let body = json!({"usage": {"prompt_tokens": 10, "completion_tokens": 5, "cache_n": 6, "prompt_n": 4}});
        let usage = from_json_body(&body);
        assert_eq!(usage.cache_n, Some(6));
        assert_eq!(usage.prompt_n, Some(4));
    }

    #[test]
    fn missing_cache_n_and_prompt_n_are_none() {
        let body = json!({"usage": {"prompt_tokens": 10, "completion_tokens": 5}});
        let usage = from_json_body(&body);
        assert_eq!(usage.cache_n, None);
        assert_eq!(usage.prompt_n, None);
    }
}
