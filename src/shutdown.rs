// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Graceful shutdown coordination: closes the listening socket, then waits
//! for in-flight forwards to drain, then stops every running model so its
//! runtime interval is finalised.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

pub enum ShutdownResult {
    Complete,
    Timeout { remaining: usize },
}

/// Broadcasts a shutdown signal and tracks how many requests are still
/// in flight so the caller knows when it is safe to stop models.
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
    in_flight: std::sync::atomic::AtomicUsize,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx,
            in_flight: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn enter(&self) {
        self.in_flight
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn leave(&self) {
        self.in_flight
            .fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn remaining(&self) -> usize {
        self.in_flight.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Signal shutdown and wait up to `grace` for in-flight forwards to drain.
    pub async fn initiate(&self, grace: Duration) -> ShutdownResult {
        let _ = self.tx.send(true);
        let deadline = async {
            while self.remaining() > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        match timeout(grace, deadline).await {
            Ok(()) => ShutdownResult::Complete,
            Err(_) => ShutdownResult::Timeout {
                remaining: self.remaining(),
            },
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
