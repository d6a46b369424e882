// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend and infrastructure error types.

use cmdq_core::QueueError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from finalizing, materializing, or orchestrating a run.
///
/// Infrastructure problems (missing tmux/sbatch, unwritable session
/// directory) are raised before any script is materialized. Job failures
/// are never errors; they live in status files.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Session directory could not be created or written.
    #[error("session directory {path:?} is not writable: {source}")]
    SessionDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A required external command is missing from PATH.
    #[error("required command {command:?} not found on PATH")]
    MissingCommand { command: String },

    /// Spawning a child process failed.
    #[error("failed to spawn {command:?}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Replacing the current process (`run` with `system=true`) failed.
    #[error("exec failed: {0}")]
    Exec(String),

    /// The user declined to clear pre-existing tmux sessions.
    #[error("refusing to run: existing tmux sessions: {}", names.join(", "))]
    StaleSessions { names: Vec<String> },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
