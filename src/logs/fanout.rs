// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Multi-subscriber log fan-out. A new subscriber first replays the
//! current buffer as `historical` events, then a `historical_complete`
//! marker, then live `realtime` events until it disconnects.
//!
//! The producer half (`append`) is a fast, non-blocking send: a full
//! subscriber queue is dropped rather than allowed to apply backpressure
//! to the append path, per the "never block the producer" requirement.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::buffer::{LogLine, RingBuffer};
use super::sse::LogEvent;

struct QueuedLine {
    queued_at: Instant,
    line: LogLine,
}

struct Subscription {
    tx: mpsc::Sender<QueuedLine>,
    /// Set by `append` when this subscriber's queue overflows, so that once
    /// the closed channel surfaces as `None` on the receiving end, the
    /// subscriber can tell an overflow apart from a clean producer close.
    lagged: Arc<AtomicBool>,
}

struct ModelLog {
    buffer: Mutex<RingBuffer>,
    subscriptions: Mutex<HashMap<u64, Subscription>>,
    next_subscriber_id: AtomicU64,
}

impl ModelLog {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(RingBuffer::new(capacity)),
            subscriptions: Mutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
        }
    }
}

pub struct LogFanout {
    models: Mutex<HashMap<String, Arc<ModelLog>>>,
    capacity: usize,
    queue_depth: usize,
    soft_deadline: Duration,
}

pub struct Subscriber {
    rx: mpsc::Receiver<QueuedLine>,
    soft_deadline: Duration,
    queue_depth: usize,
    replay_done: bool,
    replay: std::vec::IntoIter<LogLine>,
    closed: bool,
    lagged: Arc<AtomicBool>,
}

impl Subscriber {
    /// Returns the next SSE event, or `None` once the stream has ended
    /// (producer closed, or this subscriber was dropped for lag).
    pub async fn next_event(&mut self) -> Option<LogEvent> {
        if self.closed {
            return None;
        }

        if !self.replay_done {
            if let Some(line) = self.replay.next() {
                return Some(LogEvent::Historical { log: line });
            }
            self.replay_done = true;
            return Some(LogEvent::HistoricalComplete);
        }

        match self.rx.recv().await {
            Some(queued) => {
                if queued.queued_at.elapsed() > self.soft_deadline {
                    self.closed = true;
                    return Some(LogEvent::Error {
                        message: format!(
                            "subscriber lag exceeded soft deadline of {:?}",
                            self.soft_deadline
                        ),
                    });
                }
                Some(LogEvent::Realtime { log: queued.line })
            }
            None => {
                self.closed = true;
                if self.lagged.load(Ordering::Relaxed) {
                    Some(LogEvent::Error {
                        message: format!("subscriber dropped: outbound queue exceeded depth of {}", self.queue_depth),
                    })
                } else {
                    Some(LogEvent::StreamEnd)
                }
            }
        }
    }
}

impl LogFanout {
    pub fn new(capacity: usize, queue_depth: usize, soft_deadline: Duration) -> Self {
        Self {
            models: Mutex::new(HashMap::new()),
            capacity,
            queue_depth,
            soft_deadline,
        }
    }

    fn model_log(&self, model: &str) -> Arc<ModelLog> {
        let mut models = self.models.lock();
        models
            .entry(model.to_string())
            .or_insert_with(|| Arc::new(ModelLog::new(self.capacity)))
            .clone()
    }

    /// Always succeeds, evicting the oldest buffered line if at capacity
    /// and dropping (not blocking on) any subscriber whose queue is full.
    pub fn append(&self, model: &str, timestamp: f64, text: impl Into<String>) {
        let line = LogLine { timestamp, text: text.into() };
        let log = self.model_log(model);

        log.buffer.lock().push(line.clone());

        let mut subs = log.subscriptions.lock();
        subs.retain(|_, sub| {
            match sub.tx.try_send(QueuedLine { queued_at: Instant::now(), line: line.clone() }) {
                Ok(()) => true,
                Err(_) => {
                    sub.lagged.store(true, Ordering::Relaxed);
                    false
                }
            }
        });
    }

    /// Subscribes to a model's log stream: historical replay, then tail.
    pub fn subscribe(&self, model: &str) -> Subscriber {
        let log = self.model_log(model);
        let snapshot = log.buffer.lock().snapshot();
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let id = log.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let lagged = Arc::new(AtomicBool::new(false));
        log.subscriptions.lock().insert(id, Subscription { tx, lagged: lagged.clone() });

        Subscriber {
            rx,
            soft_deadline: self.soft_deadline,
            queue_depth: self.queue_depth,
            replay_done: snapshot.is_empty(),
            replay: snapshot.into_iter(),
            closed: false,
            lagged,
        }
    }

    pub fn clear(&self, model: &str, now: f64, keep_minutes: u64) {
        let log = self.model_log(model);
        log.buffer.lock().clear(now, keep_minutes);
    }

    /// Buffer occupancy and subscriber counts across all models, for
    /// `/api/logs/stats`.
    pub fn stats(&self) -> HashMap<String, LogStats> {
        let models = self.models.lock();
        models
            .iter()
            .map(|(name, log)| {
                (
                    name.clone(),
                    LogStats {
                        buffered_lines: log.buffer.lock().len(),
                        subscriber_count: log.subscriptions.lock().len(),
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct LogStats {
    pub buffered_lines: usize,
    pub subscriber_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_then_tail_preserves_order() {
        let fanout = LogFanout::new(2000, 256, Duration::from_secs(5));
        for i in 0..500 {
            fanout.append("m1", i as f64, format!("L{i}"));
        }

        let mut sub = fanout.subscribe("m1");
        let mut historical = Vec::new();
        loop {
            match sub.next_event().await.unwrap() {
                LogEvent::Historical { log } => historical.push(log.text),
                LogEvent::HistoricalComplete => break,
                _ => panic!("unexpected event during replay"),
            }
        }
        assert_eq!(historical.len(), 500);
        assert_eq!(historical[0], "L0");
        assert_eq!(historical[499], "L499");

        fanout.append("m1", 500.0, "L500");
        fanout.append("m1", 501.0, "L501");
        fanout.append("m1", 502.0, "L502");

        for expected in ["L500", "L501", "L502"] {
            match sub.next_event().await.unwrap() {
                LogEvent::Realtime { log } => assert_eq!(log.text, expected),
                other => panic!("expected realtime event, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn overflowing_subscriber_is_dropped_without_blocking_producer() {
        let fanout = LogFanout::new(2000, 4, Duration::from_secs(5));
        let sub = fanout.subscribe("m1");
        // Never drained; producer must not block even past queue depth.
        for i in 0..50 {
            fanout.append("m1", i as f64, format!("L{i}"));
        }
        drop(sub);
        // If append blocked, this test would hang instead of reaching here.
    }

    #[tokio::test]
    async fn overflowed_subscriber_observes_an_error_event() {
        let fanout = LogFanout::new(2000, 4, Duration::from_secs(5));
        let mut sub = fanout.subscribe("m1");
        match sub.next_event().await.unwrap() {
            LogEvent::HistoricalComplete => {}
            other => panic!("expected historical_complete, got {other:?}"),
        }

        for i in 0..50 {
            fanout.append("m1", i as f64, format!("L{i}"));
        }

        let mut saw_error = false;
        while let Some(event) = sub.next_event().await {
            match event {
                LogEvent::Realtime { .. } => continue,
                LogEvent::Error { .. } => {
                    saw_error = true;
                    break;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(saw_error, "overflowed subscriber should see an explicit error event");
    }
}
