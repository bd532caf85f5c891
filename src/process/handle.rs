// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! A running (or exited) backend process, plus the plumbing that shuttles
//! its stdout/stderr into the Log Fan-Out and reports unsolicited exit.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct ProcessHandle {
    pub pid: u32,
    pub model: String,
    child: Arc<parking_lot::Mutex<Option<tokio::process::Child>>>,
    stdout_task: Option<JoinHandle<()>>,
    stderr_task: Option<JoinHandle<()>>,
    pub(super) exited: Arc<Notify>,
    pub(super) exit_code: Arc<parking_lot::Mutex<Option<i32>>>,
}

impl ProcessHandle {
    pub(super) fn new(
        pid: u32,
        model: String,
        child: tokio::process::Child,
        stdout_task: JoinHandle<()>,
        stderr_task: JoinHandle<()>,
        exited: Arc<Notify>,
        exit_code: Arc<parking_lot::Mutex<Option<i32>>>,
    ) -> Self {
        Self {
            pid,
            model,
            child: Arc::new(parking_lot::Mutex::new(Some(child))),
            stdout_task: Some(stdout_task),
            stderr_task: Some(stderr_task),
            exited,
            exit_code,
        }
    }

    /// True while the child has not been observed to exit. This does not
    /// itself poll the OS; the exit-watcher task updates `exit_code` as
    /// soon as `wait()` resolves.
    pub fn is_alive(&self) -> bool {
        self.exit_code.lock().is_none()
    }

    pub fn exit_code(&self) -> Option<i32> {
        *self.exit_code.lock()
    }

    /// Waits until the process has exited, however that happens.
    pub async fn wait_for_exit(&self) {
        if self.exit_code.lock().is_some() {
            return;
        }
        self.exited.notified().await;
    }

    pub(super) fn take_child(&self) -> Option<tokio::process::Child> {
        self.child.lock().take()
    }

    /// A cheap, cloneable handle on just the exit signal, so a caller that
    /// does not own the `ProcessHandle` itself (it has been moved into the
    /// lifecycle controller's entry) can still await exit independently.
    pub fn exit_watch(&self) -> ExitWatch {
        ExitWatch {
            exited: self.exited.clone(),
            exit_code: self.exit_code.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExitWatch {
    exited: Arc<Notify>,
    exit_code: Arc<parking_lot::Mutex<Option<i32>>>,
}

impl ExitWatch {
    pub async fn wait(&self) {
        if self.exit_code.lock().is_some() {
            return;
        }
        self.exited.notified().await;
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Some(task) = self.stdout_task.take() {
            task.abort();
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }
}
