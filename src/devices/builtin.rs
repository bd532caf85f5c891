// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Built-in device adapters. These are sensible defaults for a single-host
//! deployment; real GPU vendors (CUDA, ROCm, Metal) register their own
//! adapters the same way through `DeviceRegistry::register`.

use async_trait::async_trait;

use super::adapter::{DeviceAdapter, DeviceSnapshot};

/// Reports host RAM as a pseudo-device named `cpu`, for CPU-only launch
/// variants. Always online; memory figures come from `/proc/meminfo` on
/// Linux and fall back to a conservative static snapshot elsewhere.
pub struct CpuDevice {
    total_mb: u64,
}

impl CpuDevice {
    pub fn new() -> Self {
        Self {
            total_mb: read_total_mb().unwrap_or(16_384),
        }
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceAdapter for CpuDevice {
    fn id(&self) -> &str {
        "cpu"
    }

    async fn online(&self) -> bool {
        true
    }

    async fn snapshot(&self) -> DeviceSnapshot {
        let free_mb = read_free_mb().unwrap_or(self.total_mb / 2);
        DeviceSnapshot {
            kind: "cpu".to_string(),
            memory_kind: "system".to_string(),
            total_mb: self.total_mb,
            free_mb,
            used_mb: self.total_mb.saturating_sub(free_mb),
            util_percent: 0.0,
            temperature_c: None,
        }
    }
}

#[cfg(target_os = "linux")]
fn read_total_mb() -> Option<u64> {
    read_meminfo_field("MemTotal:")
}

#[cfg(target_os = "linux")]
fn read_free_mb() -> Option<u64> {
    read_meminfo_field("MemAvailable:")
}

#[cfg(target_os = "linux")]
fn read_meminfo_field(label: &str) -> Option<u64> {
    let text = std::fs::read_to_string("/proc/meminfo").ok()?;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(label) {
            let kb: u64 = rest.trim().split_whitespace().next()?.parse().ok()?;
            return Some(kb / 1024);
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn read_total_mb() -> Option<u64> {
    None
}

#[cfg(not(target_os = "linux"))]
fn read_free_mb() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cpu_device_is_always_online() {
        let dev = CpuDevice::new();
        assert!(dev.online().await);
        assert_eq!(dev.id(), "cpu");
    }

    #[tokio::test]
    async fn cpu_snapshot_has_consistent_totals() {
        let dev = CpuDevice::new();
        let snap = dev.snapshot().await;
        assert_eq!(snap.free_mb + snap.used_mb, snap.total_mb);
    }
}
