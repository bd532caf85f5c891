// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Process Runner: spawn, stream, and terminate backend model processes.

pub mod handle;
pub mod runner;

pub use handle::{ExitWatch, ProcessHandle};
pub use runner::{ProcessError, ProcessRunner};
