// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Device Adapter Registry: per-device online state and memory snapshots,
//! used by the Lifecycle Controller's variant selection and admission
//! checks.

pub mod adapter;
pub mod builtin;
pub mod registry;

pub use adapter::{DeviceAdapter, DeviceSnapshot};
pub use registry::DeviceRegistry;
