// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `/api/analytics/*` - usage summaries and bucketed trend series.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::accounting::{
    aggregate, cost_trend, merge_cost_trend, merge_token_trend, token_trend, totals, BucketSeries, CostTrendSeries,
    TokenTrendSeries,
};
use crate::error::GatewayError;
use crate::http::state::AppState;
use crate::lifecycle::ModelStatus;

#[derive(Serialize)]
pub struct ModeUsage {
    total_tokens: u64,
    total_cost: f64,
}

#[derive(Serialize)]
pub struct UsageSummary {
    overall: ModeUsage,
    by_mode: HashMap<String, ModeUsage>,
}

pub async fn usage_summary(
    State(state): State<AppState>,
    Path((t0, t1)): Path<(f64, f64)>,
) -> Result<Json<UsageSummary>, GatewayError> {
    let accounting = state.accounting.clone();
    let by_model: Vec<(String, String)> = state
        .config
        .all()
        .map(|(name, def)| (name.clone(), def.mode.to_string()))
        .collect();

    let summary = tokio::task::spawn_blocking(move || -> Result<UsageSummary, GatewayError> {
        let mut overall = ModeUsage { total_tokens: 0, total_cost: 0.0 };
        let mut by_mode: HashMap<String, ModeUsage> = HashMap::new();

        for (model, mode) in by_model {
            let records = accounting
                .requests_in_window(&model, t0, t1)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let pricing = accounting
                .load_pricing(&model)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let t = totals(&records, &pricing);
            let tokens = t.in_tokens + t.out_tokens;

            overall.total_tokens += tokens;
            overall.total_cost += t.cost;

            let entry = by_mode.entry(mode).or_insert(ModeUsage { total_tokens: 0, total_cost: 0.0 });
            entry.total_tokens += tokens;
            entry.total_cost += t.cost;
        }

        Ok(UsageSummary { overall, by_mode })
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;

    Ok(Json(summary))
}

/// Bucketed token totals per class (input/output/total/cache-hit/
/// cache-miss), grouped by interface mode. Distinct from `cost_trends`:
/// this carries no pricing at all.
#[derive(Serialize)]
pub struct TokenTrendsReport {
    pub series: TokenTrendSeries,
    pub by_mode: HashMap<String, TokenTrendSeries>,
}

pub async fn token_trends(
    State(state): State<AppState>,
    Path((t0, t1, n)): Path<(f64, f64, usize)>,
) -> Result<Json<TokenTrendsReport>, GatewayError> {
    let accounting = state.accounting.clone();
    let by_model: Vec<(String, String)> =
        state.config.all().map(|(name, def)| (name.clone(), def.mode.to_string())).collect();

    let report = tokio::task::spawn_blocking(move || -> Result<TokenTrendsReport, GatewayError> {
        let buckets = n.max(1);
        let mut overall: Option<TokenTrendSeries> = None;
        let mut by_mode: HashMap<String, TokenTrendSeries> = HashMap::new();

        for (model, mode) in by_model {
            let records = accounting
                .requests_in_window(&model, t0, t1)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let series = token_trend(&records, t0, t1, buckets);

            overall = Some(match overall {
                None => series.clone(),
                Some(acc) => merge_token_trend(acc, series.clone()),
            });
            by_mode
                .entry(mode)
                .and_modify(|existing| *existing = merge_token_trend(existing.clone(), series.clone()))
                .or_insert(series);
        }

        let series = overall.unwrap_or_else(|| token_trend(&[], t0, t1, buckets));
        Ok(TokenTrendsReport { series, by_mode })
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;

    Ok(Json(report))
}

/// Bucketed cost per class, grouped by interface mode. Distinct from
/// `token_trends`: this runs every record through the pricing evaluator
/// instead of just summing token counts.
#[derive(Serialize)]
pub struct CostTrendsReport {
    pub series: CostTrendSeries,
    pub by_mode: HashMap<String, CostTrendSeries>,
}

pub async fn cost_trends(
    State(state): State<AppState>,
    Path((t0, t1, n)): Path<(f64, f64, usize)>,
) -> Result<Json<CostTrendsReport>, GatewayError> {
    let accounting = state.accounting.clone();
    let by_model: Vec<(String, String)> =
        state.config.all().map(|(name, def)| (name.clone(), def.mode.to_string())).collect();

    let report = tokio::task::spawn_blocking(move || -> Result<CostTrendsReport, GatewayError> {
        let buckets = n.max(1);
        let mut overall: Option<CostTrendSeries> = None;
        let mut by_mode: HashMap<String, CostTrendSeries> = HashMap::new();

        for (model, mode) in by_model {
            let records = accounting
                .requests_in_window(&model, t0, t1)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let pricing = accounting
                .load_pricing(&model)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let series = cost_trend(&records, &pricing, t0, t1, buckets);

            overall = Some(match overall {
                None => series.clone(),
                Some(acc) => merge_cost_trend(acc, series.clone()),
            });
            by_mode
                .entry(mode)
                .and_modify(|existing| *existing = merge_cost_trend(existing.clone(), series.clone()))
                .or_insert(series);
        }

        let series = overall.unwrap_or_else(|| cost_trend(&[], &crate::accounting::PricingConfig::default(), t0, t1, buckets));
        Ok(CostTrendsReport { series, by_mode })
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;

    Ok(Json(report))
}

#[derive(Serialize)]
pub struct ModelStats {
    status: ModelStatus,
    series: BucketSeries,
}

pub async fn model_stats(
    State(state): State<AppState>,
    Path((alias, t0, t1, n)): Path<(String, f64, f64, usize)>,
) -> Result<Json<ModelStats>, GatewayError> {
    let canonical = state
        .config
        .resolve(&alias)
        .ok_or_else(|| GatewayError::ModelNotFound(alias.clone()))?
        .to_string();
    let status = state.lifecycle.status(&canonical);
    let series = model_series_for(&state, &canonical, t0, t1, n).await?;
    Ok(Json(ModelStats { status, series }))
}

async fn model_series_for(state: &AppState, model: &str, t0: f64, t1: f64, n: usize) -> Result<BucketSeries, GatewayError> {
    let accounting = state.accounting.clone();
    let model = model.to_string();
    tokio::task::spawn_blocking(move || -> Result<BucketSeries, GatewayError> {
        let records = accounting
            .requests_in_window(&model, t0, t1)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        let pricing = accounting
            .load_pricing(&model)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(aggregate(&records, &pricing, t0, t1, n.max(1)))
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))?
}
