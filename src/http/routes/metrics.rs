// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! `/api/metrics/throughput/*` - per-second token-class throughput and
//! session-total request series.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::accounting::{merge_throughput, throughput as throughput_series, throughput_distribution, totals, ThroughputSeries, WindowTotals};
use crate::error::GatewayError;
use crate::http::state::AppState;
use crate::telemetry::BucketedHistogramSnapshot;

/// Response for `/api/metrics/throughput/{t0}/{t1}/{n}`: the fleet-wide
/// series across the five token classes (see §4.6's throughput definition),
/// a histogram of the series' own per-bucket total rate, and the same
/// series grouped by each model's declared interface mode.
#[derive(Serialize)]
pub struct ThroughputReport {
    pub series: ThroughputSeries,
    pub distribution: BucketedHistogramSnapshot,
    pub by_mode: HashMap<String, ThroughputSeries>,
}

pub async fn throughput(
    State(state): State<AppState>,
    Path((t0, t1, n)): Path<(f64, f64, usize)>,
) -> Result<Json<ThroughputReport>, GatewayError> {
    let accounting = state.accounting.clone();
    let by_model: Vec<(String, String)> =
        state.config.all().map(|(name, def)| (name.clone(), def.mode.to_string())).collect();

    let report = tokio::task::spawn_blocking(move || -> Result<ThroughputReport, GatewayError> {
        let buckets = n.max(1);
        let mut overall: Option<ThroughputSeries> = None;
        let mut by_mode: HashMap<String, ThroughputSeries> = HashMap::new();

        for (model, mode) in by_model {
            let records = accounting
                .requests_in_window(&model, t0, t1)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let series = throughput_series(&records, t0, t1, buckets);

            overall = Some(match overall {
                None => series.clone(),
                Some(acc) => merge_throughput(acc, series.clone()),
            });
            by_mode
                .entry(mode)
                .and_modify(|existing| *existing = merge_throughput(existing.clone(), series.clone()))
                .or_insert(series);
        }

        let series = overall.unwrap_or_else(|| throughput_series(&[], t0, t1, buckets));
        let distribution = throughput_distribution(&series);
        Ok(ThroughputReport { series, distribution, by_mode })
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;

    Ok(Json(report))
}

pub async fn throughput_current_session(State(state): State<AppState>) -> Result<Json<WindowTotals>, GatewayError> {
    let accounting = state.accounting.clone();
    let models: Vec<String> = state.config.canonical_names().into_iter().cloned().collect();
    let t0 = state.started_at_epoch;

    let result = tokio::task::spawn_blocking(move || -> Result<WindowTotals, GatewayError> {
        let t1 = f64::MAX;
        let mut sum = WindowTotals::default();
        for model in models {
            let records = accounting
                .requests_in_window(&model, t0, t1)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let pricing = accounting
                .load_pricing(&model)
                .map_err(|e| GatewayError::Internal(e.to_string()))?;
            let t = totals(&records, &pricing);
            sum.request_count += t.request_count;
            sum.in_tokens += t.in_tokens;
            sum.out_tokens += t.out_tokens;
            sum.cost += t.cost;
        }
        Ok(sum)
    })
    .await
    .map_err(|e| GatewayError::Internal(e.to_string()))??;

    Ok(Json(result))
}
