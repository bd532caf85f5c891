// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! fleet-core - a local LLM fleet orchestrator and OpenAI-compatible
//! gateway.
//!
//! Owns no inference itself: it starts, stops, and health-checks backend
//! model processes on demand, proxies OpenAI-shaped HTTP traffic to
//! whichever one is serving a given model, and meters what each request
//! costs.

pub mod accounting;
pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
pub mod http;
pub mod interfaces;
pub mod lifecycle;
pub mod logs;
pub mod process;
pub mod proxy;
pub mod shutdown;
pub mod telemetry;

use std::sync::Arc;
use std::time::Instant;

use accounting::AccountingStore;
use config::{ConfigError, ConfigStore, ProgramSettings};
use devices::DeviceRegistry;
use http::AppState;
use interfaces::InterfaceRegistry;
use lifecycle::ModelLifecycleController;
use logs::LogFanout;
use process::ProcessRunner;
use proxy::RoutingProxy;
use shutdown::ShutdownCoordinator;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Accounting(#[from] accounting::AccountingError),
}

/// The composition root: every subsystem wired together, ready to serve.
pub struct Fleet {
    pub settings: Arc<ProgramSettings>,
    pub config: Arc<ConfigStore>,
    pub devices: Arc<DeviceRegistry>,
    pub interfaces: Arc<InterfaceRegistry>,
    pub logs: Arc<LogFanout>,
    pub runner: Arc<ProcessRunner>,
    pub accounting: Arc<AccountingStore>,
    pub lifecycle: Arc<ModelLifecycleController>,
    pub proxy: Arc<RoutingProxy>,
    pub shutdown: Arc<ShutdownCoordinator>,
}

impl Fleet {
    pub fn bootstrap(settings: ProgramSettings) -> Result<Self, BootstrapError> {
        let settings = Arc::new(settings);

        let devices = Arc::new(DeviceRegistry::with_builtins(settings.device_snapshot_ttl()));
        let interfaces = Arc::new(InterfaceRegistry::with_builtins());
        let config = Arc::new(ConfigStore::load(&settings.catalogue_path, &devices, &interfaces)?);

        let logs = Arc::new(LogFanout::new(
            settings.log_buffer_capacity,
            settings.log_subscriber_queue_depth,
            settings.log_soft_deadline(),
        ));
        let runner = Arc::new(ProcessRunner::new(logs.clone()));
        let accounting = Arc::new(AccountingStore::open(&settings.database_path.to_string_lossy())?);

        let lifecycle = Arc::new(ModelLifecycleController::new(
            config.clone(),
            devices.clone(),
            interfaces.clone(),
            runner.clone(),
            accounting.clone(),
            settings.clone(),
        ));
        let proxy = Arc::new(RoutingProxy::new(config.clone(), interfaces.clone(), lifecycle.clone(), accounting.clone()));
        let shutdown = Arc::new(ShutdownCoordinator::default());

        Ok(Self {
            settings,
            config,
            devices,
            interfaces,
            logs,
            runner,
            accounting,
            lifecycle,
            proxy,
            shutdown,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            config: self.config.clone(),
            devices: self.devices.clone(),
            interfaces: self.interfaces.clone(),
            lifecycle: self.lifecycle.clone(),
            accounting: self.accounting.clone(),
            logs: self.logs.clone(),
            proxy: self.proxy.clone(),
            settings: self.settings.clone(),
            started_at: Instant::now(),
            started_at_epoch: http::state::now_epoch_secs(),
        }
    }

    /// Starts every model flagged `auto_start` in the catalogue. Failures
    /// are logged, not fatal: a single bad model should not block the
    /// gateway from serving everything else.
    pub async fn autostart(&self) {
        let models: Vec<String> = self.config.auto_start_models().cloned().collect();
        for model in models {
            if let Err(e) = self.lifecycle.ensure_running(&model).await {
                tracing::warn!(model = %model, error = %e, "auto-start failed");
            }
        }
    }

    /// Runs the idle sweeper and the HTTP server until the listener
    /// returns (normally only on bind failure; shutdown is driven by the
    /// caller via `shutdown`).
    pub async fn serve(self: Arc<Self>) -> std::io::Result<()> {
        let state = self.app_state();
        let stop_rx = self.shutdown.subscribe();
        tokio::spawn(self.lifecycle.clone().run_idle_sweeper(stop_rx));
        http::run(state, &self.settings.host, self.settings.port).await
    }
}
