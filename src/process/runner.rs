// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Process Runner: spawns a backend from a launch script, captures its
//! stdout/stderr line by line without blocking the child, and terminates
//! it cooperatively then forcefully. Never interprets process output;
//! that is the Interface Adapter's job.

use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::Notify;

use crate::logs::LogFanout;

use super::handle::ProcessHandle;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn launch script {0}: {1}")]
    SpawnFailed(String, String),
}

pub struct ProcessRunner {
    fanout: Arc<LogFanout>,
}

impl ProcessRunner {
    pub fn new(fanout: Arc<LogFanout>) -> Self {
        Self { fanout }
    }

    pub fn spawn(&self, model: &str, script_path: &str) -> Result<ProcessHandle, ProcessError> {
        let mut cmd = Command::new(script_path);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(false);

        // Put the child in its own process group so `stop` can signal the
        // whole tree, not just the immediate launch-script process.
        #[cfg(unix)]
        unsafe {
            use std::os::unix::process::CommandExt;
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(script_path.to_string(), e.to_string()))?;

        let pid = child
            .id()
            .ok_or_else(|| ProcessError::SpawnFailed(script_path.to_string(), "child exited immediately".into()))?;

        let stdout = child.stdout.take().expect("stdout piped");
        let stderr = child.stderr.take().expect("stderr piped");

        let stdout_task = tokio::spawn(pump_lines(model.to_string(), stdout, self.fanout.clone()));
        let stderr_task = tokio::spawn(pump_lines(model.to_string(), stderr, self.fanout.clone()));

        let exited = Arc::new(Notify::new());
        let exit_code = Arc::new(parking_lot::Mutex::new(None));

        let handle = ProcessHandle::new(
            pid,
            model.to_string(),
            child,
            stdout_task,
            stderr_task,
            exited.clone(),
            exit_code.clone(),
        );

        Ok(handle)
    }

    /// Awaits process exit in the background, recording the exit code and
    /// waking anyone blocked on `ProcessHandle::wait_for_exit`. Spawned
    /// separately from `spawn` so the caller can install the handle (and
    /// thus have something to hand the lifecycle state machine) first.
    pub fn watch_exit(&self, handle: &ProcessHandle) {
        let Some(mut child) = handle.take_child() else {
            return;
        };
        let exited = handle.exited.clone();
        let exit_code = handle.exit_code.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            *exit_code.lock() = Some(status.ok().and_then(|s| s.code()).unwrap_or(-1));
            exited.notify_waiters();
        });
    }

    /// Idempotent: sends a soft signal, waits up to `grace`, then sends a
    /// hard signal and reaps. Succeeds (no-op) if the process is already
    /// gone.
    pub async fn stop(&self, handle: &ProcessHandle, grace: Duration) -> Result<(), ProcessError> {
        if !handle.is_alive() {
            return Ok(());
        }

        send_signal(handle.pid, SoftOrHard::Soft);

        let deadline = tokio::time::sleep(grace);
        tokio::pin!(deadline);
        tokio::select! {
            _ = handle.wait_for_exit() => return Ok(()),
            _ = &mut deadline => {}
        }

        if handle.is_alive() {
            send_signal(handle.pid, SoftOrHard::Hard);
            handle.wait_for_exit().await;
        }

        Ok(())
    }

    pub fn alive(&self, handle: &ProcessHandle) -> bool {
        handle.is_alive()
    }
}

enum SoftOrHard {
    Soft,
    Hard,
}

#[cfg(unix)]
fn send_signal(pid: u32, kind: SoftOrHard) {
    let sig = match kind {
        SoftOrHard::Soft => libc::SIGTERM,
        SoftOrHard::Hard => libc::SIGKILL,
    };
    // Negative pid targets the whole process group created by `setsid`
    // in `spawn`, reaching the launch script's descendants too.
    unsafe {
        libc::kill(-(pid as i32), sig);
    }
}

#[cfg(not(unix))]
fn send_signal(pid: u32, kind: SoftOrHard) {
    // Best effort on non-Unix targets: there is no process-group signal
    // delivery equivalent exposed here, so only the direct child is
    // reachable via taskkill semantics the standard library does not
    // expose either; this is a known platform gap.
    let _ = (pid, kind);
}

async fn pump_lines(
    model: String,
    reader: impl tokio::io::AsyncRead + Unpin,
    fanout: Arc<LogFanout>,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                fanout.append(&model, now_secs(), line);
            }
            Ok(None) => break,
            Err(e) => {
                fanout.append(&model, now_secs(), format!("[log reader error: {e}]"));
                break;
            }
        }
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawning_missing_script_fails() {
        let fanout = Arc::new(LogFanout::new(100, 16, Duration::from_secs(5)));
        let runner = ProcessRunner::new(fanout);
        let err = runner.spawn("m1", "/nonexistent/launch-script-xyz.sh");
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn stop_on_already_dead_handle_is_idempotent() {
        let fanout = Arc::new(LogFanout::new(100, 16, Duration::from_secs(5)));
        let runner = ProcessRunner::new(fanout);
        let handle = runner.spawn("m1", "/bin/true").expect("spawn /bin/true");
        runner.watch_exit(&handle);
        handle.wait_for_exit().await;
        assert!(runner.stop(&handle, Duration::from_millis(50)).await.is_ok());
        assert!(runner.stop(&handle, Duration::from_millis(50)).await.is_ok());
    }
}
