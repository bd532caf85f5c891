// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::state::AppState;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    models_count: usize,
    running_models: Vec<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let running_models = state
        .lifecycle
        .all_statuses()
        .into_iter()
        .filter(|s| s.state == "routing")
        .map(|s| s.model)
        .collect();

    Json(HealthBody {
        status: "ok",
        models_count: state.config.canonical_names().len(),
        running_models,
    })
}
