// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Interface Adapter Registry: per-mode health probing, endpoint sets, and
//! request-path validation.

pub mod adapter;
pub mod base;
pub mod chat;
pub mod embedding;
mod probe;
pub mod registry;
pub mod reranker;

pub use adapter::{HealthOutcome, InterfaceAdapter, ValidationOutcome};
pub use registry::InterfaceRegistry;
