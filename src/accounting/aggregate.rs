// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bucketed aggregation over a request window. Each record is assigned to
//! exactly one bucket by index arithmetic and folded into per-bucket
//! accumulators in a single pass, rather than re-scanning the record set
//! once per bucket.

use serde::Serialize;

use crate::telemetry::buckets::{BucketedHistogram, BucketedHistogramSnapshot};

use super::pricing::PricingConfig;
use super::records::RequestRecord;

#[derive(Debug, Clone, Serialize)]
pub struct BucketSeries {
    pub bucket_starts: Vec<f64>,
    pub request_count: Vec<u64>,
    pub in_tokens: Vec<u64>,
    pub out_tokens: Vec<u64>,
    pub cost: Vec<f64>,
}

/// Aggregates `records` into `buckets` equal-width buckets covering
/// `[t0, t1]`. `t1` must be greater than `t0` and `buckets` greater than 0.
pub fn aggregate(records: &[RequestRecord], pricing: &PricingConfig, t0: f64, t1: f64, buckets: usize) -> BucketSeries {
    assert!(buckets > 0, "bucket count must be positive");
    assert!(t1 > t0, "window end must be after window start");

    let width = (t1 - t0) / buckets as f64;
    let mut request_count = vec![0u64; buckets];
    let mut in_tokens = vec![0u64; buckets];
    let mut out_tokens = vec![0u64; buckets];
    let mut cost = vec![0f64; buckets];

    for record in records {
        if record.ts < t0 || record.ts > t1 {
            continue;
        }
        let idx = (((record.ts - t0) / width) as usize).min(buckets - 1);
        request_count[idx] += 1;
        in_tokens[idx] += record.in_tok;
        out_tokens[idx] += record.out_tok;
        cost[idx] += pricing.tiered_cost(record);
    }

    let bucket_starts = (0..buckets).map(|i| t0 + i as f64 * width).collect();

    BucketSeries { bucket_starts, request_count, in_tokens, out_tokens, cost }
}

#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct WindowTotals {
    pub request_count: u64,
    pub in_tokens: u64,
    pub out_tokens: u64,
    pub cost: f64,
}

pub fn totals(records: &[RequestRecord], pricing: &PricingConfig) -> WindowTotals {
    let mut totals = WindowTotals::default();
    for record in records {
        totals.request_count += 1;
        totals.in_tokens += record.in_tok;
        totals.out_tokens += record.out_tok;
        totals.cost += pricing.tiered_cost(record);
    }
    totals
}

/// Raw per-bucket sums shared by the trend and throughput views, so each
/// only has to decide how to present the same single pass over `records`.
struct TokenBuckets {
    input: Vec<u64>,
    output: Vec<u64>,
    cache_hit: Vec<u64>,
    cache_miss: Vec<u64>,
    width: f64,
}

fn bucket_tokens(records: &[RequestRecord], t0: f64, t1: f64, buckets: usize) -> TokenBuckets {
    assert!(buckets > 0, "bucket count must be positive");
    assert!(t1 > t0, "window end must be after window start");

    let width = (t1 - t0) / buckets as f64;
    let mut input = vec![0u64; buckets];
    let mut output = vec![0u64; buckets];
    let mut cache_hit = vec![0u64; buckets];
    let mut cache_miss = vec![0u64; buckets];

    for record in records {
        if record.ts < t0 || record.ts > t1 {
            continue;
        }
        let idx = (((record.ts - t0) / width) as usize).min(buckets - 1);
        input[idx] += record.in_tok;
        output[idx] += record.out_tok;
        cache_hit[idx] += record.cache_n;
        cache_miss[idx] += record.prompt_n;
    }

    TokenBuckets { input, output, cache_hit, cache_miss, width }
}

fn bucket_starts(t0: f64, width: f64, buckets: usize) -> Vec<f64> {
    (0..buckets).map(|i| t0 + i as f64 * width).collect()
}

/// Per-second throughput across the five token classes: input, output,
/// total, cache-hit (`cache_n`), and cache-miss (`prompt_n`), each bucket
/// normalised by its own width rather than the whole-window duration.
#[derive(Debug, Clone, Serialize)]
pub struct ThroughputSeries {
    pub bucket_starts: Vec<f64>,
    pub input_per_sec: Vec<f64>,
    pub output_per_sec: Vec<f64>,
    pub total_per_sec: Vec<f64>,
    pub cache_hit_per_sec: Vec<f64>,
    pub cache_miss_per_sec: Vec<f64>,
}

pub fn throughput(records: &[RequestRecord], t0: f64, t1: f64, buckets: usize) -> ThroughputSeries {
    let b = bucket_tokens(records, t0, t1, buckets);
    let per_sec = |v: &[u64]| v.iter().map(|&n| n as f64 / b.width).collect::<Vec<f64>>();
    let total: Vec<u64> = b.input.iter().zip(&b.output).map(|(i, o)| i + o).collect();

    ThroughputSeries {
        bucket_starts: bucket_starts(t0, b.width, buckets),
        input_per_sec: per_sec(&b.input),
        output_per_sec: per_sec(&b.output),
        total_per_sec: per_sec(&total),
        cache_hit_per_sec: per_sec(&b.cache_hit),
        cache_miss_per_sec: per_sec(&b.cache_miss),
    }
}

pub fn merge_throughput(mut a: ThroughputSeries, b: ThroughputSeries) -> ThroughputSeries {
    for i in 0..a.input_per_sec.len().min(b.input_per_sec.len()) {
        a.input_per_sec[i] += b.input_per_sec[i];
        a.output_per_sec[i] += b.output_per_sec[i];
        a.total_per_sec[i] += b.total_per_sec[i];
        a.cache_hit_per_sec[i] += b.cache_hit_per_sec[i];
        a.cache_miss_per_sec[i] += b.cache_miss_per_sec[i];
    }
    a
}

/// A throughput series plus a histogram of its own per-bucket total rate,
/// giving a shape-of-the-distribution view alongside the time series.
pub fn throughput_distribution(series: &ThroughputSeries) -> BucketedHistogramSnapshot {
    let hist = BucketedHistogram::throughput();
    for &v in &series.total_per_sec {
        hist.observe(v);
    }
    hist.snapshot()
}

/// Token totals per bucket (not normalised per second), across the same
/// five classes as [`throughput`].
#[derive(Debug, Clone, Serialize)]
pub struct TokenTrendSeries {
    pub bucket_starts: Vec<f64>,
    pub input_tokens: Vec<u64>,
    pub output_tokens: Vec<u64>,
    pub total_tokens: Vec<u64>,
    pub cache_hit_tokens: Vec<u64>,
    pub cache_miss_tokens: Vec<u64>,
}

pub fn token_trend(records: &[RequestRecord], t0: f64, t1: f64, buckets: usize) -> TokenTrendSeries {
    let b = bucket_tokens(records, t0, t1, buckets);
    let total: Vec<u64> = b.input.iter().zip(&b.output).map(|(i, o)| i + o).collect();

    TokenTrendSeries {
        bucket_starts: bucket_starts(t0, b.width, buckets),
        input_tokens: b.input,
        output_tokens: b.output,
        total_tokens: total,
        cache_hit_tokens: b.cache_hit,
        cache_miss_tokens: b.cache_miss,
    }
}

pub fn merge_token_trend(mut a: TokenTrendSeries, b: TokenTrendSeries) -> TokenTrendSeries {
    for i in 0..a.input_tokens.len().min(b.input_tokens.len()) {
        a.input_tokens[i] += b.input_tokens[i];
        a.output_tokens[i] += b.output_tokens[i];
        a.total_tokens[i] += b.total_tokens[i];
        a.cache_hit_tokens[i] += b.cache_hit_tokens[i];
        a.cache_miss_tokens[i] += b.cache_miss_tokens[i];
    }
    a
}

/// Cost per bucket, independent of the token-count trend so the two
/// analytics endpoints return genuinely different data.
#[derive(Debug, Clone, Serialize)]
pub struct CostTrendSeries {
    pub bucket_starts: Vec<f64>,
    pub cost: Vec<f64>,
}

pub fn cost_trend(records: &[RequestRecord], pricing: &PricingConfig, t0: f64, t1: f64, buckets: usize) -> CostTrendSeries {
    assert!(buckets > 0, "bucket count must be positive");
    assert!(t1 > t0, "window end must be after window start");

    let width = (t1 - t0) / buckets as f64;
    let mut cost = vec![0f64; buckets];
    for record in records {
        if record.ts < t0 || record.ts > t1 {
            continue;
        }
        let idx = (((record.ts - t0) / width) as usize).min(buckets - 1);
        cost[idx] += pricing.tiered_cost(record);
    }

    CostTrendSeries { bucket_starts: bucket_starts(t0, width, buckets), cost }
}

pub fn merge_cost_trend(mut a: CostTrendSeries, b: CostTrendSeries) -> CostTrendSeries {
    for i in 0..a.cost.len().min(b.cost.len()) {
        a.cost[i] += b.cost[i];
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::pricing::Tier;

    fn flat_pricing() -> PricingConfig {
        PricingConfig {
            use_tiered: true,
            tiers: vec![Tier {
                tier_idx: 1,
                in_min: 0,
                in_max: -1,
                out_min: 0,
                out_max: -1,
                in_price: 1.0,
                out_price: 1.0,
                cache_ok: false,
                cache_write_price: 0.0,
                cache_read_price: 0.0,
            }],
            hourly_price: 0.0,
        }
    }

    #[test]
    fn records_land_in_expected_buckets() {
        let records = vec![
            RequestRecord { ts: 0.5, in_tok: 10, out_tok: 1, cache_n: 0, prompt_n: 10 },
            RequestRecord { ts: 5.5, in_tok: 20, out_tok: 1, cache_n: 0, prompt_n: 20 },
            RequestRecord { ts: 9.9, in_tok: 30, out_tok: 1, cache_n: 0, prompt_n: 30 },
        ];
        let series = aggregate(&records, &flat_pricing(), 0.0, 10.0, 2);
        assert_eq!(series.request_count, vec![1, 2]);
        assert_eq!(series.in_tokens, vec![10, 50]);
    }

    #[test]
    fn out_of_window_records_are_excluded() {
        let records = vec![RequestRecord { ts: 100.0, in_tok: 10, out_tok: 1, cache_n: 0, prompt_n: 10 }];
        let series = aggregate(&records, &flat_pricing(), 0.0, 10.0, 2);
        assert_eq!(series.request_count, vec![0, 0]);
    }

    #[test]
    fn last_bucket_is_inclusive_of_window_end() {
        let records = vec![RequestRecord { ts: 10.0, in_tok: 1, out_tok: 1, cache_n: 0, prompt_n: 1 }];
        let series = aggregate(&records, &flat_pricing(), 0.0, 10.0, 2);
        assert_eq!(series.request_count, vec![0, 1]);
    }

    #[test]
    fn totals_sum_every_record_once() {
        let records = vec![
            RequestRecord { ts: 0.0, in_tok: 10, out_tok: 2, cache_n: 0, prompt_n: 10 },
            RequestRecord { ts: 1.0, in_tok: 5, out_tok: 3, cache_n: 0, prompt_n: 5 },
        ];
        let t = totals(&records, &flat_pricing());
        assert_eq!(t.request_count, 2);
        assert_eq!(t.in_tokens, 15);
        assert_eq!(t.out_tokens, 5);
    }

    #[test]
    fn throughput_normalises_by_bucket_width() {
        let records = vec![RequestRecord { ts: 1.0, in_tok: 10, out_tok: 5, cache_n: 4, prompt_n: 6 }];
        // One 5-second bucket covering the whole window.
        let series = throughput(&records, 0.0, 5.0, 1);
        assert_eq!(series.input_per_sec, vec![2.0]);
        assert_eq!(series.output_per_sec, vec![1.0]);
        assert_eq!(series.total_per_sec, vec![3.0]);
        assert_eq!(series.cache_hit_per_sec, vec![0.8]);
        assert_eq!(series.cache_miss_per_sec, vec![1.2]);
    }

    #[test]
    fn token_trend_is_not_normalised() {
        let records = vec![RequestRecord { ts: 1.0, in_tok: 10, out_tok: 5, cache_n: 4, prompt_n: 6 }];
        let trend = token_trend(&records, 0.0, 5.0, 1);
        assert_eq!(trend.input_tokens, vec![10]);
        assert_eq!(trend.total_tokens, vec![15]);
        assert_eq!(trend.cache_hit_tokens, vec![4]);
        assert_eq!(trend.cache_miss_tokens, vec![6]);
    }

    #[test]
    fn cost_trend_differs_from_token_trend() {
        let records = vec![
            RequestRecord { ts: 1.0, in_tok: 10, out_tok: 5, cache_n: 0, prompt_n: 10 },
            RequestRecord { ts: 6.0, in_tok: 20, out_tok: 10, cache_n: 0, prompt_n: 20 },
        ];
        let cost = cost_trend(&records, &flat_pricing(), 0.0, 10.0, 2);
        assert_eq!(cost.cost, vec![15.0, 30.0]);
    }

    #[test]
    fn throughput_distribution_observes_every_bucket() {
        let records = vec![
            RequestRecord { ts: 1.0, in_tok: 100, out_tok: 0, cache_n: 0, prompt_n: 100 },
            RequestRecord { ts: 6.0, in_tok: 200, out_tok: 0, cache_n: 0, prompt_n: 200 },
        ];
        let series = throughput(&records, 0.0, 10.0, 2);
        let snapshot = throughput_distribution(&series);
        assert_eq!(snapshot.count, 2);
    }
}
