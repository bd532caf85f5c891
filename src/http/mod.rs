// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! The HTTP gateway surface: OpenAI-compatible routing plus the
//! administrative, log, device, metrics, analytics, billing, and data
//! APIs described in the external interfaces.

pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_router, run};
pub use state::AppState;
