// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-model bounded ring buffer of log lines.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: f64,
    pub text: String,
}

pub struct RingBuffer {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Always succeeds, evicting the oldest line if at capacity.
    pub fn push(&mut self, line: LogLine) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Keeps only lines newer than `now - keep_minutes`; `keep_minutes == 0`
    /// wipes the buffer entirely.
    pub fn clear(&mut self, now: f64, keep_minutes: u64) {
        if keep_minutes == 0 {
            self.lines.clear();
            return;
        }
        let horizon = now - (keep_minutes as f64 * 60.0);
        self.lines.retain(|l| l.timestamp >= horizon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut buf = RingBuffer::new(2);
        buf.push(LogLine { timestamp: 1.0, text: "a".into() });
        buf.push(LogLine { timestamp: 2.0, text: "b".into() });
        buf.push(LogLine { timestamp: 3.0, text: "c".into() });
        let snap = buf.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].text, "b");
        assert_eq!(snap[1].text, "c");
    }

    #[test]
    fn clear_zero_wipes_everything() {
        let mut buf = RingBuffer::new(10);
        buf.push(LogLine { timestamp: 100.0, text: "a".into() });
        buf.clear(200.0, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn clear_keeps_recent_lines_only() {
        let mut buf = RingBuffer::new(10);
        buf.push(LogLine { timestamp: 0.0, text: "old".into() });
        buf.push(LogLine { timestamp: 590.0, text: "recent".into() });
        // now=600, keep_minutes=1 -> horizon=540
        buf.clear(600.0, 1);
        let snap = buf.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].text, "recent");
    }
}
