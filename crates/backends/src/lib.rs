// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cmdq-backends: turns a job graph into runnable artifacts.
//!
//! A [`Queue`] binds the graph to one backend: serial (one script), tmux
//! (N worker scripts plus a bookkeeper), or slurm (an `sbatch` driver).
//! It finalizes the graph into script text, materializes the session
//! directory, and
//! orchestrates execution. Graph-shape problems fail loudly before any
//! file is written; per-job runtime failures are absorbed into status
//! files and only surface in the aggregate outcome.

pub mod error;
pub mod partition;
pub mod queue;
pub mod serial;
pub mod slurm;
pub mod state;
pub mod tmux;

pub use error::BackendError;
pub use queue::{
    Artifact, Backend, BackendKind, Queue, RunOptions, RunOutcome, ScriptFile,
};
pub use serial::SerialOptions;
pub use slurm::SlurmOptions;
pub use state::StateSnapshot;
pub use tmux::{OnFail, OtherSessionHandler, TmuxOptions};
