// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Program settings: the `toml` file governing everything that is not the
//! model catalogue itself.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgramSettings {
    pub host: String,
    pub port: u16,
    pub catalogue_path: PathBuf,
    pub database_path: PathBuf,
    pub idle_sweep_secs: u64,
    pub idle_timeout_secs: u64,
    pub health_timeout_secs: u64,
    pub log_buffer_capacity: usize,
    pub log_subscriber_queue_depth: usize,
    pub log_soft_deadline_secs: u64,
    pub device_snapshot_ttl_secs: u64,
    pub shutdown_grace_secs: u64,
    pub termination_grace_secs: u64,
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            catalogue_path: PathBuf::from("models.yaml"),
            database_path: PathBuf::from("webui/monitoring.db"),
            idle_sweep_secs: 30,
            idle_timeout_secs: 15 * 60,
            health_timeout_secs: 300,
            log_buffer_capacity: 2000,
            log_subscriber_queue_depth: 256,
            log_soft_deadline_secs: 5,
            device_snapshot_ttl_secs: 1,
            shutdown_grace_secs: 30,
            termination_grace_secs: 10,
        }
    }
}

impl ProgramSettings {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
    }

    pub fn idle_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.idle_sweep_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn log_soft_deadline(&self) -> Duration {
        Duration::from_secs(self.log_soft_deadline_secs)
    }

    pub fn device_snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.device_snapshot_ttl_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn termination_grace(&self) -> Duration {
        Duration::from_secs(self.termination_grace_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(String, String),
    #[error("failed to parse config file {0}: {1}")]
    Parse(String, String),
    #[error("failed to parse model catalogue {0}: {1}")]
    CatalogueParse(String, String),
    #[error("duplicate alias {0} claimed by both {1} and {2}")]
    DuplicateAlias(String, String, String),
    #[error("model {0} declares unregistered mode {1}")]
    UnknownMode(String, String),
    #[error("model {0} variant {1} references unregistered device {2}")]
    UnknownDevice(String, String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let s = ProgramSettings::default();
        assert_eq!(s.idle_sweep_secs, 30);
        assert_eq!(s.idle_timeout_secs, 900);
        assert_eq!(s.health_timeout_secs, 300);
        assert_eq!(s.log_buffer_capacity, 2000);
        assert_eq!(s.log_subscriber_queue_depth, 256);
        assert_eq!(s.log_soft_deadline_secs, 5);
        assert_eq!(s.device_snapshot_ttl_secs, 1);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml_text = "port = 9090\n";
        let s: ProgramSettings = toml::from_str(toml_text).unwrap();
        assert_eq!(s.port, 9090);
        assert_eq!(s.host, "127.0.0.1");
    }
}
