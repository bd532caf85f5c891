// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tiered/hourly pricing config and the per-request cost evaluator.

use serde::{Deserialize, Serialize};

use super::records::{RequestRecord, RuntimeInterval};

/// `-1` denotes an unbounded side of a half-open `(min, max]` range.
const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tier {
    pub tier_idx: u32,
    pub in_min: i64,
    pub in_max: i64,
    pub out_min: i64,
    pub out_max: i64,
    pub in_price: f64,
    pub out_price: f64,
    pub cache_ok: bool,
    pub cache_write_price: f64,
    pub cache_read_price: f64,
}

impl Tier {
    fn matches(&self, in_tok: u64, out_tok: u64) -> bool {
        in_bounds(self.in_min, self.in_max, in_tok) && in_bounds(self.out_min, self.out_max, out_tok)
    }
}

fn in_bounds(min: i64, max: i64, value: u64) -> bool {
    let value = value as i64;
    let above_min = value > min;
    let below_max = max == UNBOUNDED || value <= max;
    above_min && below_max
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub use_tiered: bool,
    pub tiers: Vec<Tier>,
    pub hourly_price: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { use_tiered: true, tiers: Vec::new(), hourly_price: 0.0 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("tier {0} already exists with conflicting bounds")]
    TierConflict(u32),
    #[error("cannot delete the last remaining tier")]
    LastTierDeletion,
    #[error("invalid pricing configuration: {0}")]
    Invalid(String),
}

impl PricingConfig {
    /// Selects the lowest-index tier whose bounds contain the request, or
    /// `None` if no tier matches (cost is then zero without raising).
    pub fn select_tier(&self, in_tok: u64, out_tok: u64) -> Option<&Tier> {
        self.tiers
            .iter()
            .filter(|t| t.matches(in_tok, out_tok))
            .min_by_key(|t| t.tier_idx)
    }

    /// §4.6.1 tiered-mode cost for one request; zero if no tier matches.
    pub fn tiered_cost(&self, record: &RequestRecord) -> f64 {
        let Some(tier) = self.select_tier(record.in_tok, record.out_tok) else {
            return 0.0;
        };
        let mut cost = (record.prompt_n as f64) * tier.in_price / 1e6
            + (record.out_tok as f64) * tier.out_price / 1e6;
        if tier.cache_ok {
            cost += (record.cache_n as f64) * tier.cache_read_price / 1e6;
        }
        cost
    }

    /// §4.6.1 hourly-mode cost for a runtime interval intersecting `[t0, t1]`.
    pub fn hourly_cost(&self, interval: &RuntimeInterval, t0: f64, t1: f64, now: f64) -> f64 {
        interval.intersect_seconds(t0, t1, now) / 3600.0 * self.hourly_price
    }

    pub fn upsert_tier(&mut self, tier: Tier) {
        if let Some(existing) = self.tiers.iter_mut().find(|t| t.tier_idx == tier.tier_idx) {
            *existing = tier;
        } else {
            self.tiers.push(tier);
        }
    }

    pub fn remove_tier(&mut self, tier_idx: u32) -> Result<(), PricingError> {
        if self.tiers.len() <= 1 && self.tiers.iter().any(|t| t.tier_idx == tier_idx) {
            return Err(PricingError::LastTierDeletion);
        }
        let before = self.tiers.len();
        self.tiers.retain(|t| t.tier_idx != tier_idx);
        if self.tiers.len() == before {
            return Err(PricingError::Invalid(format!("tier {tier_idx} does not exist")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> PricingConfig {
        PricingConfig {
            use_tiered: true,
            tiers: vec![
                Tier {
                    tier_idx: 1,
                    in_min: 0,
                    in_max: 1000,
                    out_min: 0,
                    out_max: 1000,
                    in_price: 1.0,
                    out_price: 2.0,
                    cache_ok: false,
                    cache_write_price: 0.0,
                    cache_read_price: 0.0,
                },
                Tier {
                    tier_idx: 2,
                    in_min: 0,
                    in_max: UNBOUNDED,
                    out_min: 0,
                    out_max: UNBOUNDED,
                    in_price: 2.0,
                    out_price: 4.0,
                    cache_ok: true,
                    cache_write_price: 0.0,
                    cache_read_price: 0.5,
                },
            ],
            hourly_price: 0.0,
        }
    }

    #[test]
    fn s6_tiered_cost_worked_example() {
        let config = sample_config();
        let record = RequestRecord { ts: 0.0, in_tok: 1200, out_tok: 300, cache_n: 400, prompt_n: 800 };
        let tier = config.select_tier(record.in_tok, record.out_tok).unwrap();
        assert_eq!(tier.tier_idx, 2);
        let cost = config.tiered_cost(&record);
        assert!((cost - 0.003).abs() < 1e-9);
    }

    #[test]
    fn lowest_index_wins_on_overlap() {
        let config = sample_config();
        // in=500,out=500 matches both tier 1 (<=1000/<=1000) and tier 2 (unbounded).
        let tier = config.select_tier(500, 500).unwrap();
        assert_eq!(tier.tier_idx, 1);
    }

    #[test]
    fn unmatched_request_costs_zero() {
        let config = PricingConfig {
            use_tiered: true,
            tiers: vec![Tier {
                tier_idx: 1,
                in_min: 0,
                in_max: 10,
                out_min: 0,
                out_max: 10,
                in_price: 1.0,
                out_price: 1.0,
                cache_ok: false,
                cache_write_price: 0.0,
                cache_read_price: 0.0,
            }],
            hourly_price: 0.0,
        };
        let record = RequestRecord { ts: 0.0, in_tok: 1000, out_tok: 1000, cache_n: 0, prompt_n: 1000 };
        assert_eq!(config.select_tier(record.in_tok, record.out_tok), None);
        assert_eq!(config.tiered_cost(&record), 0.0);
    }

    #[test]
    fn deleting_last_tier_is_rejected() {
        let mut config = sample_config();
        config.remove_tier(1).unwrap();
        let err = config.remove_tier(2).unwrap_err();
        assert!(matches!(err, PricingError::LastTierDeletion));
    }

    #[test]
    fn hourly_cost_scales_by_intersected_seconds() {
        let config = PricingConfig { use_tiered: false, tiers: vec![], hourly_price: 3.6 };
        let interval = RuntimeInterval { start_ts: 0.0, end_ts: 3600.0 };
        let cost = config.hourly_cost(&interval, 0.0, 3600.0, 3600.0);
        assert!((cost - 3.6).abs() < 1e-9);
    }
}
