// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! The `DeviceAdapter` trait: one implementation per compute device kind
//! (CPU, a GPU vendor, ...). Adapters are pure queries, never mutate state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub kind: String,
    pub memory_kind: String,
    pub total_mb: u64,
    pub free_mb: u64,
    pub used_mb: u64,
    pub util_percent: f32,
    pub temperature_c: Option<f32>,
}

#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    /// Unique device identifier, as referenced by catalogue `required_devices`.
    fn id(&self) -> &str;

    async fn online(&self) -> bool;

    /// A failing adapter must report `online() == false` rather than panic
    /// or return a stale snapshot; callers never need to wrap this in a
    /// separate fallibility layer.
    async fn snapshot(&self) -> DeviceSnapshot;
}
