//! Metrics for the fleet gateway.
//!
//! Defines counters, gauges, and histograms for request routing and model
//! lifecycle events. Uses the `metrics` facade - no network exporters
//! included here; a scrape endpoint, if any, lives in the HTTP layer.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Initialize metric descriptions. Call once at startup.
pub fn init_metrics() {
    describe_counter!("fleet_requests_total", "Total proxied requests");
    describe_counter!("fleet_requests_success", "Successfully proxied requests");
    describe_counter!("fleet_requests_failed", "Failed proxied requests");

    describe_histogram!("fleet_request_latency_ms", "End-to-end proxied request latency in milliseconds");

    describe_counter!("fleet_tokens_input_total", "Total input tokens billed across all models");
    describe_counter!("fleet_tokens_output_total", "Total output tokens billed across all models");

    describe_gauge!("fleet_active_models", "Number of models currently in the routing state");
    describe_gauge!("fleet_in_flight_requests", "Number of requests currently in flight");

    describe_counter!(
        "fleet_admission_rejections_total",
        "Requests rejected before a model could be started due to resource limits"
    );

    describe_histogram!("fleet_model_start_latency_seconds", "Time from start request to a model passing health checks");
    describe_counter!("fleet_model_starts_total", "Total model start attempts");
    describe_counter!("fleet_model_stops_total", "Total model stop events, including idle eviction");
}

pub fn record_model_start_latency(model: &str, latency_secs: f64) {
    counter!("fleet_model_starts_total", "model" => model.to_string()).increment(1);
    histogram!("fleet_model_start_latency_seconds", "model" => model.to_string()).record(latency_secs);
}

pub fn record_model_stop(model: &str, reason: &str) {
    counter!("fleet_model_stops_total", "model" => model.to_string(), "reason" => reason.to_string()).increment(1);
}

pub fn record_request_success(model: &str, latency_ms: u64, tokens_in: u64, tokens_out: u64) {
    counter!("fleet_requests_total", "model" => model.to_string()).increment(1);
    counter!("fleet_requests_success", "model" => model.to_string()).increment(1);
    counter!("fleet_tokens_input_total", "model" => model.to_string()).increment(tokens_in);
    counter!("fleet_tokens_output_total", "model" => model.to_string()).increment(tokens_out);
    histogram!("fleet_request_latency_ms", "model" => model.to_string()).record(latency_ms as f64);
}

pub fn record_request_failure(model: &str, error_kind: &str) {
    counter!("fleet_requests_total", "model" => model.to_string()).increment(1);
    counter!("fleet_requests_failed", "model" => model.to_string(), "error" => error_kind.to_string()).increment(1);
}

pub fn record_admission_rejection(model: &str, reason: &str) {
    counter!("fleet_requests_total", "model" => model.to_string()).increment(1);
    counter!("fleet_admission_rejections_total", "model" => model.to_string(), "reason" => reason.to_string()).increment(1);
}

pub fn record_active_models(count: usize) {
    gauge!("fleet_active_models").set(count as f64);
}

pub fn record_in_flight(count: i64) {
    gauge!("fleet_in_flight_requests").set(count as f64);
}
