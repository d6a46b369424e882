// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job definition and the submission options record.

use crate::mem::MemSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scheduler resource hints.
///
/// Serial and tmux backends only echo these into generated comments; the
/// slurm backend translates them into `sbatch` flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<MemSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    /// Deferred start time, passed verbatim to `sbatch --begin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
}

impl ResourceHints {
    pub fn is_empty(&self) -> bool {
        self.cpus.is_none()
            && self.gpus.is_none()
            && self.mem.is_none()
            && self.partition.is_none()
            && self.begin.is_none()
    }

    /// Short `key=value` summary for generated-script comments.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(cpus) = self.cpus {
            parts.push(format!("cpus={}", cpus));
        }
        if let Some(gpus) = self.gpus {
            parts.push(format!("gpus={}", gpus));
        }
        if let Some(mem) = self.mem {
            parts.push(format!("mem={}", mem));
        }
        if let Some(partition) = &self.partition {
            parts.push(format!("partition={}", partition));
        }
        if let Some(begin) = &self.begin {
            parts.push(format!("begin={}", begin));
        }
        parts.join(" ")
    }
}

/// Explicit options record for submitting one job.
///
/// An option that does not exist here cannot be silently swallowed; there
/// is no catch-all keyword funnel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "ResourceHints::is_empty")]
    pub hints: ResourceHints,
    /// Tee stdout/stderr into the job's log file.
    #[serde(default)]
    pub log: bool,
}

impl JobSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = Some(v.into());
        self
    }

    pub fn depends<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn depend(mut self, v: impl Into<String>) -> Self {
        self.depends.push(v.into());
        self
    }

    pub fn tag(mut self, v: impl Into<String>) -> Self {
        self.tags.insert(v.into());
        self
    }

    pub fn cpus(mut self, v: u32) -> Self {
        self.hints.cpus = Some(v);
        self
    }

    pub fn gpus(mut self, v: u32) -> Self {
        self.hints.gpus = Some(v);
        self
    }

    pub fn mem(mut self, v: MemSize) -> Self {
        self.hints.mem = Some(v);
        self
    }

    pub fn partition(mut self, v: impl Into<String>) -> Self {
        self.hints.partition = Some(v.into());
        self
    }

    pub fn begin(mut self, v: impl Into<String>) -> Self {
        self.hints.begin = Some(v.into());
        self
    }

    pub fn log(mut self, v: bool) -> Self {
        self.log = v;
        self
    }
}

/// One submitted job.
///
/// Owned exclusively by the [`GraphModel`](crate::GraphModel) until
/// finalize; emitters borrow read-only. Per-run file paths are derived from
/// the session directory, never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique within a queue. Auto-generated as `<queue>-job-<N>` if the
    /// spec carried no name.
    pub name: String,
    /// Opaque shell text, emitted verbatim.
    pub command: String,
    /// Names of jobs that must pass before this one runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "ResourceHints::is_empty")]
    pub hints: ResourceHints,
    #[serde(default)]
    pub log: bool,
    /// Internal poller job marker; never set by users.
    #[serde(default)]
    pub bookkeeper: bool,
    /// Submission index, the stable tie-break for topological ordering.
    pub index: usize,
}

impl Job {
    pub(crate) fn from_spec(spec: JobSpec, name: String, index: usize) -> Self {
        Self {
            name,
            command: spec.command,
            depends: spec.depends,
            tags: spec.tags,
            hints: spec.hints,
            log: spec.log,
            bookkeeper: false,
            index,
        }
    }

    /// Internal constructor for the tmux bookkeeper job.
    pub fn bookkeeper(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            depends: Vec::new(),
            tags: BTreeSet::new(),
            hints: ResourceHints::default(),
            log: false,
            bookkeeper: true,
            index: usize::MAX,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
