// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-file snapshot reader.
//!
//! Terminal states come from touch-file existence; the stat file is only
//! consulted to distinguish skipped/started. Absent or half-written files
//! read as pending/started, never as errors, since readers may race the
//! shells writing these files.

use cmdq_core::{JobState, JobStatus, SessionDir, StatLine};
use serde::{Deserialize, Serialize};

/// Uniform progress snapshot over a set of jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub jobs: Vec<JobStatus>,
}

impl StateSnapshot {
    pub fn count(&self, state: JobState) -> usize {
        self.jobs.iter().filter(|j| j.state == state).count()
    }

    pub fn all_terminal(&self) -> bool {
        self.jobs.iter().all(|j| j.state.is_terminal())
    }

    pub fn any_failed(&self) -> bool {
        self.jobs.iter().any(|j| j.state == JobState::Failed)
    }

    /// One-line progress summary for verbose blocking runs.
    pub fn progress_line(&self) -> String {
        format!(
            "{}/{} finished (passed={} failed={} skipped={})",
            self.jobs.iter().filter(|j| j.state.is_terminal()).count(),
            self.jobs.len(),
            self.count(JobState::Passed),
            self.count(JobState::Failed),
            self.count(JobState::Skipped),
        )
    }
}

/// Observe one job through its status files.
pub fn read_job_state(session_dir: &SessionDir, name: &str) -> JobState {
    let paths = session_dir.job_paths(name);
    if paths.pass_fpath.exists() {
        return JobState::Passed;
    }
    if paths.fail_fpath.exists() {
        return JobState::Failed;
    }
    match std::fs::read_to_string(&paths.stat_fpath) {
        Ok(text) => match StatLine::parse(text.trim()) {
            Some(line) if line.state == JobState::Skipped => JobState::Skipped,
            // Unparseable content means the writer is mid-flight.
            Some(_) | None => JobState::Started,
        },
        Err(_) => JobState::Pending,
    }
}

/// Snapshot every named job, in the given order.
pub fn read_state<'a, I>(session_dir: &SessionDir, names: I) -> StateSnapshot
where
    I: IntoIterator<Item = &'a str>,
{
    StateSnapshot {
        jobs: names
            .into_iter()
            .map(|name| JobStatus::new(name, read_job_state(session_dir, name)))
            .collect(),
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
