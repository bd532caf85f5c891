// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Log Fan-Out: per-model bounded ring buffer with replay-then-tail SSE
//! streaming to any number of subscribers.

pub mod buffer;
pub mod fanout;
pub mod sse;

pub use buffer::LogLine;
pub use fanout::{LogFanout, LogStats, Subscriber};
pub use sse::LogEvent;
