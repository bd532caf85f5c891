// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire shape of a log-stream SSE frame: `data: {json}\n\n`.

use serde::Serialize;

use super::buffer::LogLine;

#[derive(Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    Historical { log: LogLine },
    HistoricalComplete,
    Realtime { log: LogLine },
    StreamEnd,
    Error { message: String },
}

impl LogEvent {
    /// Renders as a single `data: {...}\n\n` SSE frame.
    pub fn to_sse_frame(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("data: {json}\n\n")
    }
}

impl std::fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sse_frame().trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_has_sse_shape() {
        let ev = LogEvent::HistoricalComplete;
        let frame = ev.to_sse_frame();
        assert!(frame.starts_with("data: "));
        assert!(frame.ends_with("\n\n"));
        assert!(frame.contains("\"type\":\"historical_complete\""));
    }

    #[test]
    fn realtime_carries_log_payload() {
        let ev = LogEvent::Realtime {
            log: LogLine { timestamp: 1.0, text: "hi".into() },
        };
        let frame = ev.to_sse_frame();
        assert!(frame.contains("\"realtime\""));
        assert!(frame.contains("\"hi\""));
    }
}
