// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `/api/billing/models/*` - tiered and hourly pricing configuration.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::accounting::{PricingConfig, Tier};
use crate::error::GatewayError;
use crate::http::state::AppState;

pub async fn get_pricing(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<PricingConfig>, GatewayError> {
    let accounting = state.accounting.clone();
    let config = tokio::task::spawn_blocking(move || accounting.load_pricing(&name))
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?
        .map_err(|e| GatewayError::Internal(e.to_string()))?;
    Ok(Json(config))
}

pub async fn upsert_tier(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(tier): Json<Tier>,
) -> Result<Json<PricingConfig>, GatewayError> {
    let accounting = state.accounting.clone();
    let updated = tokio::task::spawn_blocking(move || -> Result<PricingConfig, GatewayError> {
        let mut config = accounting.load_pricing(&name).map_err(|e| GatewayError::Internal(e.to_string()))?;
        config.upsert_tier(tier);
        accounting.save_pricing(&name, &config).map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(config)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;
    Ok(Json(updated))
}

pub async fn remove_tier(
    State(state): State<AppState>,
    Path((name, idx)): Path<(String, u32)>,
) -> Result<Json<PricingConfig>, GatewayError> {
    let accounting = state.accounting.clone();
    let updated = tokio::task::spawn_blocking(move || -> Result<PricingConfig, GatewayError> {
        let mut config = accounting.load_pricing(&name).map_err(|e| GatewayError::Internal(e.to_string()))?;
        config.remove_tier(idx).map_err(|e| match e {
            crate::accounting::PricingError::LastTierDeletion => GatewayError::LastTierDeletion,
            other => GatewayError::PricingInvalid(other.to_string()),
        })?;
        accounting.save_pricing(&name, &config).map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(config)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct HourlyBody {
    price: f64,
}

pub async fn set_hourly(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<HourlyBody>,
) -> Result<Json<PricingConfig>, GatewayError> {
    let accounting = state.accounting.clone();
    let updated = tokio::task::spawn_blocking(move || -> Result<PricingConfig, GatewayError> {
        let mut config = accounting.load_pricing(&name).map_err(|e| GatewayError::Internal(e.to_string()))?;
        config.hourly_price = body.price;
        accounting.save_pricing(&name, &config).map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(config)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;
    Ok(Json(updated))
}

pub async fn set_billing_mode(
    State(state): State<AppState>,
    Path((name, mode)): Path<(String, String)>,
) -> Result<Json<PricingConfig>, GatewayError> {
    let use_tiered = match mode.as_str() {
        "tier" => true,
        "hourly" => false,
        other => return Err(GatewayError::BadRequest(format!("unknown billing mode {other}"))),
    };
    let accounting = state.accounting.clone();
    let updated = tokio::task::spawn_blocking(move || -> Result<PricingConfig, GatewayError> {
        let mut config = accounting.load_pricing(&name).map_err(|e| GatewayError::Internal(e.to_string()))?;
        config.use_tiered = use_tiered;
        accounting.save_pricing(&name, &config).map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(config)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;
    Ok(Json(updated))
}
