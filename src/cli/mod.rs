// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for operating a running gateway from the outside:
//! health/liveness/readiness probes and a status summary, all driven by
//! plain HTTP against the gateway's own API rather than a private
//! protocol.

pub mod health;
pub mod status;

pub use health::{run_health, run_liveness, run_readiness};
pub use status::run_status;

/// Base URL of the running gateway, from `FLEET_CORE_URL` or the default
/// bind address.
pub fn default_base_url() -> String {
    std::env::var("FLEET_CORE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_falls_back_when_unset() {
        std::env::remove_var("FLEET_CORE_URL");
        assert_eq!(default_base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn default_base_url_honors_env() {
        std::env::set_var("FLEET_CORE_URL", "http://example.invalid:9000");
        assert_eq!(default_base_url(), "http://example.invalid:9000");
        std::env::remove_var("FLEET_CORE_URL");
    }
}
