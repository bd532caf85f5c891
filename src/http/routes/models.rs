// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `GET /v1/models` - OpenAI-shaped catalogue listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::state::AppState;

#[derive(Serialize)]
struct ModelListEntry {
    id: String,
    object: &'static str,
    created: i64,
    owned_by: &'static str,
    aliases: Vec<String>,
    mode: String,
}

#[derive(Serialize)]
struct ModelList {
    object: &'static str,
    data: Vec<ModelListEntry>,
}

pub async fn list_models(State(state): State<AppState>) -> Json<ModelList> {
    let data = state
        .config
        .all()
        .map(|(name, def)| ModelListEntry {
            id: name.clone(),
            object: "model",
            created: 0,
            owned_by: "fleet-core",
            aliases: def.aliases.clone(),
            mode: def.mode.to_string(),
        })
        .collect();

    Json(ModelList { object: "list", data })
}
