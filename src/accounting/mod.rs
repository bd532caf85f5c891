// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Accounting Store: durable request/runtime records, tiered and hourly
//! pricing, vectorised bucket aggregation, and orphan data detection.
//!
//! `AccountingStore` is backed by a synchronous `rusqlite::Connection`
//! behind a lock; async callers should drive it through
//! `tokio::task::spawn_blocking`.

pub mod aggregate;
pub mod db;
pub mod orphan;
pub mod pricing;
pub mod records;
pub mod safe_name;

pub use aggregate::{
    aggregate, cost_trend, merge_cost_trend, merge_throughput, merge_token_trend, throughput, throughput_distribution,
    token_trend, totals, BucketSeries, CostTrendSeries, ThroughputSeries, TokenTrendSeries, WindowTotals,
};
pub use db::{AccountingError, AccountingStore};
pub use orphan::{drop_orphan, list_orphans, OrphanError};
pub use pricing::{PricingConfig, PricingError, Tier};
pub use records::{RequestRecord, RuntimeInterval};
