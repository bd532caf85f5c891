// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `/api/models/{alias}/logs/stream`, `/api/logs/stats`, `/api/logs/{alias}/clear`.

use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::Stream;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::http::state::AppState;
use crate::logs::LogStats;

pub async fn stream(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, GatewayError> {
    let canonical = state
        .config
        .resolve(&alias)
        .ok_or_else(|| GatewayError::ModelNotFound(alias.clone()))?
        .to_string();

    let subscriber = state.logs.subscribe(&canonical);
    let stream = futures::stream::unfold(subscriber, |mut sub| async move {
        let event = sub.next_event().await?;
        let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Some((Ok(Event::default().data(json)), sub))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub async fn stats(State(state): State<AppState>) -> Json<std::collections::HashMap<String, LogStats>> {
    Json(state.logs.stats())
}

#[derive(Deserialize)]
pub struct ClearParams {
    keep_minutes: Option<u64>,
}

pub async fn clear(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    Query(params): Query<ClearParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let canonical = state
        .config
        .resolve(&alias)
        .ok_or_else(|| GatewayError::ModelNotFound(alias.clone()))?
        .to_string();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64();
    state.logs.clear(&canonical, now, params.keep_minutes.unwrap_or(0));
    Ok(Json(serde_json::json!({"success": true})))
}
