// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `fleet-core status` - a snapshot of a running gateway: uptime,
//! catalogue size, and every model's lifecycle state.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ServiceInfo {
    name: String,
    version: String,
    uptime_seconds: f64,
    models_count: usize,
}

#[derive(Debug, Deserialize)]
struct ModelStatus {
    model: String,
    state: String,
    variant: Option<String>,
    in_flight: i64,
    idle_seconds: f64,
    reason: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum StatusError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("malformed response: {0}")]
    Protocol(String),
}

/// Runs the status command; exit 0 on success, 3 on connection failure, 1
/// on a malformed response.
pub async fn run_status(base_url: &str, json_output: bool) -> i32 {
    match fetch_status(base_url).await {
        Ok((info, models)) => {
            if json_output {
                let body = serde_json::json!({ "info": info_json(&info), "models": models });
                println!("{}", serde_json::to_string_pretty(&body).unwrap());
            } else {
                print_status_human(&info, &models);
            }
            0
        }
        Err(e) => {
            eprintln!("Error fetching status: {}", e);
            match e {
                StatusError::ConnectionFailed(_) => 3,
                StatusError::Protocol(_) => 1,
            }
        }
    }
}

fn info_json(info: &ServiceInfo) -> serde_json::Value {
    serde_json::json!({
        "name": info.name,
        "version": info.version,
        "uptime_seconds": info.uptime_seconds,
        "models_count": info.models_count,
    })
}

async fn fetch_status(base_url: &str) -> Result<(ServiceInfo, Vec<ModelStatus>), StatusError> {
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let info: ServiceInfo = client
        .get(format!("{}/api/info", base_url))
        .send()
        .await
        .map_err(|e| StatusError::ConnectionFailed(e.to_string()))?
        .json()
        .await
        .map_err(|e| StatusError::Protocol(e.to_string()))?;

    let models: Vec<ModelStatus> = client
        .get(format!("{}/api/models/all-models/info", base_url))
        .send()
        .await
        .map_err(|e| StatusError::ConnectionFailed(e.to_string()))?
        .json()
        .await
        .map_err(|e| StatusError::Protocol(e.to_string()))?;

    Ok((info, models))
}

fn print_status_human(info: &ServiceInfo, models: &[ModelStatus]) {
    println!("{} v{}", info.name, info.version);
    println!("uptime: {}", format_uptime(info.uptime_seconds as u64));
    println!("models catalogued: {}", info.models_count);
    println!();

    if models.is_empty() {
        println!("no models catalogued");
        return;
    }

    println!("{:<24} {:<10} {:<12} {:>9} {:>11}", "MODEL", "STATE", "VARIANT", "IN-FLIGHT", "IDLE (s)");
    for m in models {
        println!(
            "{:<24} {:<10} {:<12} {:>9} {:>11.1}",
            truncate(&m.model, 24),
            m.state,
            m.variant.as_deref().unwrap_or("-"),
            m.in_flight,
            m.idle_seconds,
        );
        if let Some(reason) = &m.reason {
            println!("  reason: {}", reason);
        }
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uptime_buckets() {
        assert_eq!(format_uptime(0), "0m");
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(60), "1m");
        assert_eq!(format_uptime(3661), "1h 1m");
        assert_eq!(format_uptime(90061), "1d 1h 1m");
    }

    #[test]
    fn truncate_short_and_long() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a very long string", 10), "this is...");
    }

    #[tokio::test]
    async fn run_status_against_unreachable_host_is_connection_error() {
        assert_eq!(run_status("http://127.0.0.1:1", false).await, 3);
    }
}
