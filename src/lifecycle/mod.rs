// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model Lifecycle Controller: the Stopped/Starting/Routing/Failed state
//! machine, admission and eviction, idle garbage collection, and start
//! coalescing.

pub mod controller;
pub mod state;
pub mod variant;

pub use controller::ModelLifecycleController;
pub use state::{LifecycleState, ModelStatus};
