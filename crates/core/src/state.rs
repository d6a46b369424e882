// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state vocabulary and the stat-file line codec.
//!
//! Generated scripts record terminal states as touch-files whose *existence*
//! is the source of truth (`<name>.pass`, `<name>.fail`). The companion
//! `<name>.stat` file carries one advisory line. Readers must tolerate
//! absent or half-written stat files: anything unparseable reads as a job
//! that is still running.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single job as observed through its status files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// No status file written yet
    Pending,
    /// Stat file says the job began
    Started,
    /// Pass touch-file exists
    Passed,
    /// Fail touch-file exists
    Failed,
    /// Stat file says an ancestor failed and this job never ran
    Skipped,
}

impl JobState {
    /// Terminal states never change once reached.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Passed | JobState::Failed | JobState::Skipped)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobState::Pending => "pending",
            JobState::Started => "started",
            JobState::Passed => "passed",
            JobState::Failed => "failed",
            JobState::Skipped => "skipped",
        })
    }
}

/// One line of a `<name>.stat` file: `<state> <epoch-seconds> [<exit>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatLine {
    pub state: JobState,
    pub epoch_secs: u64,
    pub exit_code: Option<i32>,
}

impl StatLine {
    /// Parse a stat line, returning `None` for anything malformed.
    ///
    /// Partial writes are expected (the writing shell may race the reader),
    /// so a missing or garbled timestamp still yields a usable state when
    /// the leading token is recognizable.
    pub fn parse(line: &str) -> Option<StatLine> {
        let mut parts = line.split_whitespace();
        let state = match parts.next()? {
            "started" => JobState::Started,
            "passed" => JobState::Passed,
            "failed" => JobState::Failed,
            "skipped" => JobState::Skipped,
            _ => return None,
        };
        let epoch_secs = parts.next().and_then(|t| t.parse().ok()).unwrap_or(0);
        let exit_code = parts.next().and_then(|t| t.parse().ok());
        Some(StatLine { state, epoch_secs, exit_code })
    }
}

impl fmt::Display for StatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} {} {}", self.state, self.epoch_secs, code),
            None => write!(f, "{} {}", self.state, self.epoch_secs),
        }
    }
}

/// Snapshot entry for one job, consumed by progress reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub name: String,
    pub state: JobState,
}

impl JobStatus {
    pub fn new(name: impl Into<String>, state: JobState) -> Self {
        Self { name: name.into(), state }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
