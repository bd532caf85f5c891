// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `/api/data/*` - orphan detection and storage introspection.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::accounting::{drop_orphan, list_orphans, OrphanError};
use crate::error::GatewayError;
use crate::http::state::AppState;

pub async fn orphaned(State(state): State<AppState>) -> Result<Json<Vec<String>>, GatewayError> {
    let accounting = state.accounting.clone();
    let catalogued: std::collections::HashSet<String> = state.config.canonical_names().into_iter().cloned().collect();
    let orphans = tokio::task::spawn_blocking(move || {
        let refs = catalogued.iter().collect();
        list_orphans(&accounting, &refs)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))?
    .map_err(|e| GatewayError::Internal(e.to_string()))?;
    Ok(Json(orphans))
}

#[derive(Serialize)]
pub struct StorageStats {
    database_bytes: u64,
    per_model_request_counts: HashMap<String, u64>,
}

pub async fn storage_stats(State(state): State<AppState>) -> Result<Json<StorageStats>, GatewayError> {
    let database_bytes = std::fs::metadata(&state.settings.database_path).map(|m| m.len()).unwrap_or(0);
    let accounting = state.accounting.clone();
    let models: Vec<String> = state.config.canonical_names().into_iter().cloned().collect();

    let per_model_request_counts = tokio::task::spawn_blocking(move || -> Result<HashMap<String, u64>, GatewayError> {
        let mut counts = HashMap::new();
        for model in models {
            let records = accounting
                .requests_in_window(&model, 0.0, f64::MAX)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            counts.insert(model, records.len() as u64);
        }
        Ok(counts)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;

    Ok(Json(StorageStats { database_bytes, per_model_request_counts }))
}

pub async fn drop_model(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<serde_json::Value>, GatewayError> {
    let accounting = state.accounting.clone();
    let catalogued: std::collections::HashSet<String> = state.config.canonical_names().into_iter().cloned().collect();

    tokio::task::spawn_blocking(move || {
        let refs = catalogued.iter().collect();
        drop_orphan(&accounting, &refs, &name)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))?
    .map_err(|e| match e {
        OrphanError::StillCatalogued(name) => GatewayError::OrphanProtected(name),
        OrphanError::Accounting(e) => GatewayError::Internal(e.to_string()),
    })?;

    Ok(Json(serde_json::json!({"success": true})))
}
