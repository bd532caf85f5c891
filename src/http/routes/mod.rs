// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod admin_models;
pub mod analytics;
pub mod billing;
pub mod completions;
pub mod data;
pub mod devices;
pub mod health;
pub mod info;
pub mod logs;
pub mod metrics;
pub mod models;
