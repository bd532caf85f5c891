// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Axum router construction and the blocking serve loop.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes::{admin_models, analytics, billing, completions, data, devices, health, info, logs, metrics, models};
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(info::info))
        .route("/api/info", get(info::info))
        .route("/health", get(health::health))
        .route("/api/health", get(health::health))
        .route("/v1/models", get(models::list_models))
        .route("/v1/{*rest}", post(completions::forward))
        .route("/api/models/restart-autostart", post(admin_models::restart_autostart))
        .route("/api/models/stop-all", post(admin_models::stop_all))
        .route("/api/models/{alias}/info", get(admin_models::info))
        .route("/api/models/{alias}/start", post(admin_models::start))
        .route("/api/models/{alias}/stop", post(admin_models::stop))
        .route("/api/models/{alias}/logs/stream", get(logs::stream))
        .route("/api/logs/stats", get(logs::stats))
        .route("/api/logs/{alias}/clear", post(logs::clear))
        .route("/api/devices/info", get(devices::info))
        .route("/api/metrics/throughput/current-session", get(metrics::throughput_current_session))
        .route("/api/metrics/throughput/{t0}/{t1}/{n}", get(metrics::throughput))
        .route("/api/analytics/usage-summary/{t0}/{t1}", get(analytics::usage_summary))
        .route("/api/analytics/token-trends/{t0}/{t1}/{n}", get(analytics::token_trends))
        .route("/api/analytics/cost-trends/{t0}/{t1}/{n}", get(analytics::cost_trends))
        .route("/api/analytics/model-stats/{alias}/{t0}/{t1}/{n}", get(analytics::model_stats))
        .route("/api/billing/models/{name}/pricing", get(billing::get_pricing))
        .route("/api/billing/models/{name}/pricing/tier", post(billing::upsert_tier))
        .route("/api/billing/models/{name}/pricing/tier/{idx}", delete(billing::remove_tier))
        .route("/api/billing/models/{name}/pricing/hourly", post(billing::set_hourly))
        .route("/api/billing/models/{name}/pricing/set/{mode}", post(billing::set_billing_mode))
        .route("/api/data/models/orphaned", get(data::orphaned))
        .route("/api/data/storage/stats", get(data::storage_stats))
        .route("/api/data/models/{name}", delete(data::drop_model))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!(%host, %port, "gateway listening");
    axum::serve(listener, router).await
}
