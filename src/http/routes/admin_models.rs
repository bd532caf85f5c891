// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `/api/models/*` - explicit lifecycle control, outside the OpenAI surface.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::GatewayError;
use crate::http::state::AppState;
use crate::lifecycle::ModelStatus;

#[derive(Serialize)]
struct Acknowledged {
    success: bool,
}

fn ack() -> Json<Acknowledged> {
    Json(Acknowledged { success: true })
}

#[derive(Serialize)]
#[serde(untagged)]
enum InfoResponse {
    Single(ModelStatus),
    All(Vec<ModelStatus>),
}

pub async fn info(State(state): State<AppState>, Path(alias): Path<String>) -> Result<Json<InfoResponse>, GatewayError> {
    if alias == "all-models" {
        return Ok(Json(InfoResponse::All(state.lifecycle.all_statuses())));
    }
    let canonical = state
        .config
        .resolve(&alias)
        .ok_or_else(|| GatewayError::ModelNotFound(alias.clone()))?;
    Ok(Json(InfoResponse::Single(state.lifecycle.status(canonical))))
}

pub async fn start(State(state): State<AppState>, Path(alias): Path<String>) -> Result<Json<Acknowledged>, GatewayError> {
    state.lifecycle.ensure_running(&alias).await?;
    Ok(ack())
}

pub async fn stop(State(state): State<AppState>, Path(alias): Path<String>) -> Result<Json<Acknowledged>, GatewayError> {
    state.lifecycle.stop(&alias).await?;
    Ok(ack())
}

pub async fn restart_autostart(State(state): State<AppState>) -> Result<Json<Acknowledged>, GatewayError> {
    let autostart: Vec<String> = state.config.auto_start_models().cloned().collect();
    for model in &autostart {
        let _ = state.lifecycle.stop(model).await;
    }
    for model in &autostart {
        state.lifecycle.ensure_running(model).await?;
    }
    Ok(ack())
}

pub async fn stop_all(State(state): State<AppState>) -> Result<Json<Acknowledged>, GatewayError> {
    let names: Vec<String> = state.config.canonical_names().into_iter().cloned().collect();
    for model in names {
        let _ = state.lifecycle.stop(&model).await;
    }
    Ok(ack())
}
