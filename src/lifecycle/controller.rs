// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model Lifecycle Controller: owns the Stopped/Starting/Routing/Failed
//! state machine for every catalogued model, admission and eviction,
//! idle garbage collection, and start serialization.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::accounting::AccountingStore;
use crate::config::{ConfigStore, ModelDefinition, ProgramSettings};
use crate::devices::DeviceRegistry;
use crate::error::GatewayError;
use crate::interfaces::InterfaceRegistry;
use crate::process::{ExitWatch, ProcessHandle, ProcessRunner};

use super::state::{LifecycleState, ModelStatus};
use super::variant::select_variant;

struct ModelEntry {
    state: Mutex<LifecycleState>,
    last_activity: Mutex<Instant>,
    in_flight: AtomicI64,
    handle: Mutex<Option<ProcessHandle>>,
    started: Notify,
}

impl ModelEntry {
    fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Stopped),
            last_activity: Mutex::new(Instant::now()),
            in_flight: AtomicI64::new(0),
            handle: Mutex::new(None),
            started: Notify::new(),
        }
    }

    fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }
}

pub struct ModelLifecycleController {
    config: Arc<ConfigStore>,
    devices: Arc<DeviceRegistry>,
    interfaces: Arc<InterfaceRegistry>,
    runner: Arc<ProcessRunner>,
    accounting: Arc<AccountingStore>,
    settings: Arc<ProgramSettings>,
    entries: DashMap<String, Arc<ModelEntry>>,
    global_start_serial: tokio::sync::Mutex<()>,
}

impl ModelLifecycleController {
    pub fn new(
        config: Arc<ConfigStore>,
        devices: Arc<DeviceRegistry>,
        interfaces: Arc<InterfaceRegistry>,
        runner: Arc<ProcessRunner>,
        accounting: Arc<AccountingStore>,
        settings: Arc<ProgramSettings>,
    ) -> Self {
        Self {
            config,
            devices,
            interfaces,
            runner,
            accounting,
            settings,
            entries: DashMap::new(),
            global_start_serial: tokio::sync::Mutex::new(()),
        }
    }

    fn entry_for(&self, model: &str) -> Arc<ModelEntry> {
        self.entries
            .entry(model.to_string())
            .or_insert_with(|| Arc::new(ModelEntry::new()))
            .clone()
    }

    /// Resolves an alias to a running backend's port, starting it if
    /// necessary. Concurrent calls for the same model coalesce onto a
    /// single in-flight start.
    pub async fn ensure_running(&self, alias: &str) -> Result<u16, GatewayError> {
        let canonical = self
            .config
            .resolve(alias)
            .ok_or_else(|| GatewayError::ModelNotFound(alias.to_string()))?
            .to_string();
        let def = self
            .config
            .get(&canonical)
            .cloned()
            .ok_or_else(|| GatewayError::ModelNotFound(canonical.clone()))?;
        let entry = self.entry_for(&canonical);

        loop {
            let snapshot = entry.state.lock().clone();
            match snapshot {
                LifecycleState::Routing { .. } => {
                    let alive = match entry.handle.lock().as_ref() {
                        Some(handle) => self.runner.alive(handle),
                        None => false,
                    };
                    if alive {
                        entry.touch();
                        return Ok(def.port);
                    }
                    // The backend died without the exit monitor having
                    // flipped the state yet. Treat it as failed and fall
                    // through to a fresh start below.
                    *entry.state.lock() = LifecycleState::Failed {
                        reason: format!("{canonical} process exited unexpectedly"),
                    };
                    break;
                }
                LifecycleState::Starting { deadline, .. } => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    let notified = entry.started.notified();
                    if tokio::time::timeout(remaining.max(Duration::from_millis(1)), notified)
                        .await
                        .is_err()
                    {
                        return Err(GatewayError::StartTimeout(canonical));
                    }
                    continue;
                }
                LifecycleState::Stopped | LifecycleState::Failed { .. } => break,
            }
        }

        {
            let mut state = entry.state.lock();
            if state.is_routing() {
                entry.touch();
                return Ok(def.port);
            }
            *state = LifecycleState::Starting {
                variant: String::new(),
                deadline: Instant::now() + self.settings.health_timeout(),
            };
        }

        let result = self.start_model(&canonical, &def, &entry).await;
        match &result {
            Ok(variant_name) => {
                *entry.state.lock() = LifecycleState::Routing {
                    variant: variant_name.clone(),
                    runtime_interval_start: now_secs(),
                };
                entry.touch();
            }
            Err(e) => {
                *entry.state.lock() = LifecycleState::Failed { reason: e.to_string() };
            }
        }
        entry.started.notify_waiters();
        result.map(|_| def.port)
    }

    async fn start_model(&self, canonical: &str, def: &ModelDefinition, entry: &Arc<ModelEntry>) -> Result<String, GatewayError> {
        let _serial = self.global_start_serial.lock().await;

        // Someone else may have finished starting this model while we
        // waited for the process-wide start lock.
        if entry.state.lock().is_routing() {
            if let LifecycleState::Routing { variant, .. } = entry.state.lock().clone() {
                return Ok(variant);
            }
        }

        let online = self.devices.online_set().await;
        let variant = select_variant(&def.variants, &online)
            .ok_or_else(|| GatewayError::NoUsableDevice(canonical.to_string()))?
            .clone();

        self.ensure_admission(canonical, &variant, &online).await?;

        let handle = self
            .runner
            .spawn(canonical, &variant.launch_script)
            .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;
        self.runner.watch_exit(&handle);
        let exit_watch = handle.exit_watch();
        *entry.handle.lock() = Some(handle);
        self.spawn_exit_monitor(canonical.to_string(), entry.clone(), exit_watch);

        let started_at = Instant::now();
        let timeout = self.settings.health_timeout();
        let outcome = self.interfaces.health(def.mode.as_str(), def.port, started_at, timeout).await;
        if !outcome.ok {
            self.stop_process(canonical, entry, self.settings.termination_grace()).await;
            return Err(GatewayError::StartTimeout(
                outcome.reason.unwrap_or_else(|| format!("{canonical} failed health checks")),
            ));
        }

        self.accounting
            .open_runtime_interval(canonical, now_secs())
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        Ok(variant.name)
    }

    /// Watches a started process for unsolicited exit and drives the
    /// Routing -> Failed transition when one is observed. A no-op if the
    /// model has since been deliberately stopped or restarted: `stop_process`
    /// always sets `Stopped` before the process actually dies, so this only
    /// ever fires for a genuine crash.
    fn spawn_exit_monitor(&self, canonical: String, entry: Arc<ModelEntry>, watch: ExitWatch) {
        let accounting = self.accounting.clone();
        tokio::spawn(async move {
            watch.wait().await;
            let became_failed = {
                let mut state = entry.state.lock();
                if state.is_routing() {
                    *state = LifecycleState::Failed {
                        reason: format!("{canonical} process exited unexpectedly"),
                    };
                    true
                } else {
                    false
                }
            };
            if became_failed {
                let _ = accounting.close_runtime_interval(&canonical, now_secs());
                entry.started.notify_waiters();
            }
        });
    }

    /// Evicts idle routing models, oldest-activity first, until the
    /// candidate variant's device requirements can plausibly be met.
    async fn ensure_admission(
        &self,
        canonical: &str,
        variant: &crate::config::LaunchVariant,
        online: &std::collections::HashSet<String>,
    ) -> Result<(), GatewayError> {
        if variant.memory_mb.is_empty() {
            return Ok(());
        }

        let mut deficits: HashMap<String, i64> = HashMap::new();
        for device in online {
            if let Some(&required) = variant.memory_mb.get(device) {
                let (_, snapshot) = self.devices.status(device).await;
                let deficit = required as i64 - snapshot.free_mb as i64;
                if deficit > 0 {
                    deficits.insert(device.clone(), deficit);
                }
            }
        }
        if deficits.is_empty() {
            return Ok(());
        }

        let mut candidates: Vec<(String, Duration)> = self
            .entries
            .iter()
            .filter(|kv| kv.key() != canonical)
            .filter(|kv| kv.value().state.lock().is_routing())
            .filter(|kv| kv.value().in_flight.load(Ordering::SeqCst) == 0)
            .map(|kv| (kv.key().clone(), kv.value().idle_for()))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        for (other, _) in candidates {
            if deficits.values().all(|&d| d <= 0) {
                break;
            }
            let other_entry = self.entry_for(&other);
            if let Some(other_def) = self.config.get(&other) {
                let variant_name = other_entry.state.lock().variant_name().map(str::to_string);
                if let Some(variant_name) = variant_name {
                    if let Some(other_variant) = other_def.variants.iter().find(|v| v.name == variant_name) {
                        for (device, mb) in &other_variant.memory_mb {
                            if let Some(d) = deficits.get_mut(device) {
                                *d -= *mb as i64;
                            }
                        }
                    }
                }
            }
            self.stop(&other).await?;
        }

        if deficits.values().any(|&d| d > 0) {
            return Err(GatewayError::InsufficientMemory(canonical.to_string()));
        }
        Ok(())
    }

    /// Stops a running or starting model. Cancels an in-progress start.
    pub async fn stop(&self, alias: &str) -> Result<(), GatewayError> {
        let canonical = self
            .config
            .resolve(alias)
            .ok_or_else(|| GatewayError::ModelNotFound(alias.to_string()))?
            .to_string();
        let entry = self.entry_for(&canonical);
        self.stop_process(&canonical, &entry, self.settings.termination_grace()).await;
        Ok(())
    }

    async fn stop_process(&self, canonical: &str, entry: &Arc<ModelEntry>, grace: Duration) {
        // Mark stopped before the process actually dies so the exit
        // monitor sees a deliberate stop, not a crash, and leaves the
        // state alone.
        *entry.state.lock() = LifecycleState::Stopped;
        let handle = entry.handle.lock().take();
        if let Some(handle) = handle {
            let _ = self.runner.stop(&handle, grace).await;
        }
        let _ = self.accounting.close_runtime_interval(canonical, now_secs());
        entry.started.notify_waiters();
    }

    pub fn request_started(&self, canonical: &str) {
        let entry = self.entry_for(canonical);
        entry.in_flight.fetch_add(1, Ordering::SeqCst);
        entry.touch();
    }

    pub fn request_finished(&self, canonical: &str) {
        let entry = self.entry_for(canonical);
        entry.in_flight.fetch_sub(1, Ordering::SeqCst);
        entry.touch();
    }

    pub fn status(&self, canonical: &str) -> ModelStatus {
        let entry = self.entry_for(canonical);
        let state = entry.state.lock().clone();
        ModelStatus {
            model: canonical.to_string(),
            state: state.label().to_string(),
            variant: state.variant_name().map(str::to_string),
            in_flight: entry.in_flight.load(Ordering::SeqCst),
            idle_seconds: entry.idle_for().as_secs_f64(),
            reason: match &state {
                LifecycleState::Failed { reason } => Some(reason.clone()),
                _ => None,
            },
        }
    }

    pub fn all_statuses(&self) -> Vec<ModelStatus> {
        self.config.canonical_names().into_iter().map(|name| self.status(name)).collect()
    }

    /// Stops any model idle (zero in-flight requests, past the idle
    /// timeout) since its last activity. Intended to run on a fixed
    /// interval for the lifetime of the process.
    pub async fn sweep_idle(&self) {
        let idle_timeout = self.settings.idle_timeout();
        let candidates: Vec<String> = self
            .entries
            .iter()
            .filter(|kv| {
                let in_flight = kv.value().in_flight.load(Ordering::SeqCst);
                kv.value().state.lock().is_routing() && in_flight == 0 && kv.value().idle_for() >= idle_timeout
            })
            .map(|kv| kv.key().clone())
            .collect();
        for model in candidates {
            let _ = self.stop(&model).await;
        }
    }

    pub async fn run_idle_sweeper(self: Arc<Self>, mut stop_signal: tokio::sync::watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.settings.idle_sweep_interval());
        loop {
            tokio::select! {
                _ = interval.tick() => self.sweep_idle().await,
                _ = stop_signal.changed() => {
                    if *stop_signal.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

fn now_secs() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}
