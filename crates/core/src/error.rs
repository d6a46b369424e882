// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue construction error types.
//!
//! Everything here surfaces synchronously, before any script is written.
//! Failures inside generated scripts are never errors at this level; they are
//! recorded in status files and aggregated by `run`.

use thiserror::Error;

/// Errors raised while building a queue or finalizing its graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// A job name was submitted twice within one queue.
    ///
    /// Resubmitting an identical job is rejected the same way: the name is
    /// the identity that status files key on, so two submissions of the same
    /// name cannot coexist in one session directory.
    #[error("duplicate job name: {name:?}")]
    DuplicateJob { name: String },

    /// A dependency name never resolved to a submitted job.
    #[error("job {job:?} depends on unknown job {depend:?}")]
    UnknownDependency { job: String, depend: String },

    /// The dependency graph contains a cycle (self-loops included).
    #[error("dependency cycle involving: {}", names.join(", "))]
    CycleDetected { names: Vec<String> },

    /// A backend kind string did not match any known backend.
    #[error("unknown backend: {kind:?}")]
    UnknownBackend { kind: String },

    /// A memory hint could not be parsed.
    #[error("invalid memory size: {value:?}")]
    InvalidMem { value: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
