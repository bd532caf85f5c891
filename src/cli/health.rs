// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Health, liveness, and readiness probes for process supervisors.
//! Exit 0 on healthy/alive/ready, 1 otherwise - no distinct liveness or
//! readiness endpoint exists yet, so all three hit `/health`.

use serde::Deserialize;

pub const EXIT_HEALTHY: i32 = 0;
pub const EXIT_UNHEALTHY: i32 = 1;

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

pub async fn run_health(base_url: &str) -> i32 {
    run_check(base_url, "health").await
}

pub async fn run_liveness(base_url: &str) -> i32 {
    run_check(base_url, "liveness").await
}

pub async fn run_readiness(base_url: &str) -> i32 {
    run_check(base_url, "readiness").await
}

async fn run_check(base_url: &str, name: &str) -> i32 {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    match reqwest::get(&url).await {
        Ok(resp) if resp.status().is_success() => match resp.json::<HealthBody>().await {
            Ok(body) if body.status == "ok" => {
                eprintln!("{} check: OK", name);
                EXIT_HEALTHY
            }
            Ok(body) => {
                eprintln!("{} check: unexpected status {:?}", name, body.status);
                EXIT_UNHEALTHY
            }
            Err(e) => {
                eprintln!("{} check: malformed response: {}", name, e);
                EXIT_UNHEALTHY
            }
        },
        Ok(resp) => {
            eprintln!("{} check: HTTP {}", name, resp.status());
            EXIT_UNHEALTHY
        }
        Err(e) => {
            eprintln!("{} check error: {}", name, e);
            EXIT_UNHEALTHY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_standard() {
        assert_eq!(EXIT_HEALTHY, 0);
        assert_eq!(EXIT_UNHEALTHY, 1);
    }

    #[tokio::test]
    async fn run_health_against_unreachable_host_is_unhealthy() {
        assert_eq!(run_health("http://127.0.0.1:1").await, EXIT_UNHEALTHY);
    }

    #[tokio::test]
    async fn run_liveness_against_unreachable_host_is_unhealthy() {
        assert_eq!(run_liveness("http://127.0.0.1:1").await, EXIT_UNHEALTHY);
    }

    #[tokio::test]
    async fn run_readiness_against_unreachable_host_is_unhealthy() {
        assert_eq!(run_readiness("http://127.0.0.1:1").await, EXIT_UNHEALTHY);
    }
}
