// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Structured logging setup. Output goes to stdout only; the fleet's own
//! process log fan-out is a separate concern (`crate::logs`) for captured
//! child-process stdout/stderr, not for this process's own tracing events.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: LogFormat::Pretty, default_filter: "info".to_string() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to install global tracing subscriber: {0}")]
    Init(String),
}

/// Installs the global tracing subscriber. Call once, near the top of `main`.
pub fn init_logging(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    let result = match config.format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };

    result.map_err(|e| LogError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_info_filter() {
        let config = LogConfig::default();
        assert_eq!(config.default_filter, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
