// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifiers and the session directory layout.
//!
//! Every `run` materializes into a fresh directory named by the session id;
//! the layout below is a stable interface that state readers, the monitor,
//! and the generated bash itself all depend on:
//!
//! ```text
//! <dpath>/<session-id>/
//!   <session-id>.sh                 # serial entry script / slurm driver
//!   queue_<name>_<k>_<session>.sh   # tmux worker scripts
//!   logs/<job-name>.log
//!   job_info/<job-name>.{pass,fail,stat}
//! ```

use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

const SESSION_SUFFIX_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Lowercase a queue name into something safe for paths and tmux session
/// names: alphanumerics survive, runs of anything else collapse to one dash.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dash_pending = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if dash_pending && !out.is_empty() {
                out.push('-');
            }
            dash_pending = false;
            out.push(c.to_ascii_lowercase());
        } else {
            dash_pending = true;
        }
    }
    if out.is_empty() {
        out.push_str("queue");
    }
    out
}

/// Unique identifier for one run of a queue.
///
/// Format: `<sanitized-name>-<UTC %Y%m%dT%H%M%S>-<8-char suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id for the named queue.
    pub fn generate(name: &str, clock: &impl Clock) -> Self {
        let stamp = clock.now_utc().format("%Y%m%dT%H%M%S");
        let suffix = nanoid::nanoid!(8, &SESSION_SUFFIX_ALPHABET);
        Self(format!("{}-{}-{}", sanitize_name(name), stamp, suffix))
    }

    /// Wrap an existing id (for parsing/deserialization).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Per-job file paths inside a session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub pass_fpath: PathBuf,
    pub fail_fpath: PathBuf,
    pub stat_fpath: PathBuf,
    pub log_fpath: PathBuf,
}

/// The session directory: root plus derived locations for scripts, logs,
/// and status files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    root: PathBuf,
    session: SessionId,
}

impl SessionDir {
    pub fn new(dpath: &Path, session: SessionId) -> Self {
        Self {
            root: dpath.join(session.as_str()),
            session,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn job_info_dpath(&self) -> PathBuf {
        self.root.join("job_info")
    }

    pub fn logs_dpath(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// The single entry script (serial backend, slurm driver).
    pub fn entry_fpath(&self) -> PathBuf {
        self.root.join(format!("{}.sh", self.session))
    }

    /// Worker script `k` for the tmux backend.
    pub fn worker_fpath(&self, queue_name: &str, worker: usize) -> PathBuf {
        self.root.join(format!(
            "queue_{}_{}_{}.sh",
            sanitize_name(queue_name),
            worker,
            self.session
        ))
    }

    /// Bookkeeper script for the tmux backend.
    pub fn bookkeeper_fpath(&self, queue_name: &str) -> PathBuf {
        self.root.join(format!(
            "queue_{}_bookkeeper_{}.sh",
            sanitize_name(queue_name),
            self.session
        ))
    }

    /// Shared advisory lockfile used when jobs opt into `flock`.
    pub fn lock_fpath(&self) -> PathBuf {
        self.job_info_dpath().join(".cmdq.lock")
    }

    /// File the slurm driver appends captured job ids to.
    pub fn slurm_ids_fpath(&self) -> PathBuf {
        self.job_info_dpath().join("slurm_job_ids")
    }

    pub fn job_paths(&self, job_name: &str) -> JobPaths {
        let info = self.job_info_dpath();
        JobPaths {
            pass_fpath: info.join(format!("{}.pass", job_name)),
            fail_fpath: info.join(format!("{}.fail", job_name)),
            stat_fpath: info.join(format!("{}.stat", job_name)),
            log_fpath: self.logs_dpath().join(format!("{}.log", job_name)),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
