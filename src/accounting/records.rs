// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Durable record shapes: one request record per completed request, and
//! one runtime interval per model up-time span.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestRecord {
    pub ts: f64,
    pub in_tok: u64,
    pub out_tok: u64,
    pub cache_n: u64,
    pub prompt_n: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RuntimeInterval {
    pub start_ts: f64,
    pub end_ts: f64,
}

impl RuntimeInterval {
    /// Still open (the model has not finished this up-time span yet).
    pub fn is_open(&self) -> bool {
        self.end_ts <= self.start_ts
    }

    /// Seconds of overlap between this interval and `[t0, t1]`.
    pub fn intersect_seconds(&self, t0: f64, t1: f64, now: f64) -> f64 {
        let end = if self.is_open() { now } else { self.end_ts };
        let lo = self.start_ts.max(t0);
        let hi = end.min(t1);
        (hi - lo).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_interval_uses_now_as_end() {
        let interval = RuntimeInterval { start_ts: 10.0, end_ts: 10.0 };
        assert!(interval.is_open());
        assert_eq!(interval.intersect_seconds(0.0, 100.0, 50.0), 40.0);
    }

    #[test]
    fn closed_interval_uses_its_own_end() {
        let interval = RuntimeInterval { start_ts: 10.0, end_ts: 20.0 };
        assert_eq!(interval.intersect_seconds(0.0, 100.0, 999.0), 10.0);
    }

    #[test]
    fn no_overlap_yields_zero() {
        let interval = RuntimeInterval { start_ts: 0.0, end_ts: 5.0 };
        assert_eq!(interval.intersect_seconds(10.0, 20.0, 999.0), 0.0);
    }
}
