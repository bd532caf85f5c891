//! Integration tests for the CLI module.
//!
//! These exercise the probe and status commands against unreachable hosts
//! only; a real end-to-end run against a live gateway belongs outside the
//! unit test suite.

use fleet_core::cli::{default_base_url, run_health, run_liveness, run_readiness, run_status};

#[test]
fn default_base_url_uses_standard_bind_address_when_unset() {
    std::env::remove_var("FLEET_CORE_URL");
    assert_eq!(default_base_url(), "http://127.0.0.1:8080");
}

#[test]
fn default_base_url_respects_environment_variable() {
    std::env::set_var("FLEET_CORE_URL", "http://example.invalid:9000");
    assert_eq!(default_base_url(), "http://example.invalid:9000");
    std::env::remove_var("FLEET_CORE_URL");
}

#[tokio::test]
async fn run_health_returns_unhealthy_on_connection_failure() {
    let result = run_health("http://127.0.0.1:1").await;
    assert_eq!(result, 1);
}

#[tokio::test]
async fn run_liveness_returns_unhealthy_on_connection_failure() {
    let result = run_liveness("http://127.0.0.1:1").await;
    assert_eq!(result, 1);
}

#[tokio::test]
async fn run_readiness_returns_unhealthy_on_connection_failure() {
    let result = run_readiness("http://127.0.0.1:1").await;
    assert_eq!(result, 1);
}

#[tokio::test]
async fn all_probes_fail_consistently_against_an_unreachable_host() {
    let unreachable = "http://127.0.0.1:1";

    let health = run_health(unreachable).await;
    let live = run_liveness(unreachable).await;
    let ready = run_readiness(unreachable).await;

    assert_eq!(health, live);
    assert_eq!(live, ready);
    assert_eq!(health, 1);
}

#[tokio::test]
async fn run_status_returns_connection_error_against_an_unreachable_host() {
    let result = run_status("http://127.0.0.1:1", false).await;
    assert_eq!(result, 3);
}

#[tokio::test]
async fn concurrent_health_checks_against_an_unreachable_host_all_fail() {
    let handles: Vec<_> = (0..5)
        .map(|_| tokio::spawn(async { run_health("http://127.0.0.1:1").await }))
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 1);
    }
}
