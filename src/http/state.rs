// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared application state handed to every route handler.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::accounting::AccountingStore;
use crate::config::{ConfigStore, ProgramSettings};
use crate::devices::DeviceRegistry;
use crate::interfaces::InterfaceRegistry;
use crate::lifecycle::ModelLifecycleController;
use crate::logs::LogFanout;
use crate::proxy::RoutingProxy;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub devices: Arc<DeviceRegistry>,
    pub interfaces: Arc<InterfaceRegistry>,
    pub lifecycle: Arc<ModelLifecycleController>,
    pub accounting: Arc<AccountingStore>,
    pub logs: Arc<LogFanout>,
    pub proxy: Arc<RoutingProxy>,
    pub settings: Arc<ProgramSettings>,
    pub started_at: Instant,
    /// Same instant as `started_at`, expressed as Unix epoch seconds so it
    /// can be used as a window bound against `RequestRecord::ts`.
    pub started_at_epoch: f64,
}

/// Unix epoch seconds right now, on the same basis as `RequestRecord::ts`.
pub fn now_epoch_secs() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}
