// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::state::AppState;

#[derive(Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    uptime_seconds: f64,
    models_count: usize,
}

pub async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "fleet-core",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        models_count: state.config.canonical_names().len(),
    })
}
