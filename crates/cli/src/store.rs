// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-on-disk queue store.
//!
//! Queues persist between CLI invocations as one JSON file each under
//! `$CMDQ_HOME/queues/` (default: the user cache dir). The store is an
//! external collaborator of the core: it holds job specs, not finalized
//! scripts. Every `run` still materializes a fresh session directory
//! under `$CMDQ_HOME/runs/`.

use anyhow::{bail, Context, Result};
use cmdq_backends::{Backend, BackendKind, Queue, SerialOptions, SlurmOptions, TmuxOptions};
use cmdq_core::{GraphModel, JobSpec, SystemClock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One stored queue definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredQueue {
    pub name: String,
    pub backend: BackendKind,
    /// Where session directories go; defaults to `<store>/runs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpath: Option<PathBuf>,
    /// Tmux worker count.
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environ: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_commands: Vec<String>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
    /// Session id of the most recent run, so `show` can find status files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session: Option<String>,
}

fn default_size() -> usize {
    2
}

impl StoredQueue {
    pub fn backend(&self) -> Backend {
        match self.backend {
            BackendKind::Serial => Backend::Serial(SerialOptions::default()),
            BackendKind::Tmux => Backend::Tmux(TmuxOptions {
                size: self.size,
                ..TmuxOptions::default()
            }),
            BackendKind::Slurm => Backend::Slurm(SlurmOptions::default()),
        }
    }

    /// Materialize a runnable queue with a fresh session id.
    pub fn to_queue(&self, store: &Store) -> Result<Queue> {
        let model = GraphModel::from_jobs(&self.name, self.jobs.iter().cloned())
            .with_context(|| format!("queue '{}' is inconsistent", self.name))?;
        let dpath = self
            .dpath
            .clone()
            .unwrap_or_else(|| store.runs_dpath());
        let queue = Queue::from_model(model, self.backend(), dpath, &SystemClock)
            .environ(self.environ.iter().cloned());
        Ok(self
            .header_commands
            .iter()
            .fold(queue, |q, c| q.header_command(c.clone())))
    }
}

/// Filesystem-backed queue store.
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the store at `$CMDQ_HOME`, falling back to the user cache dir.
    pub fn open() -> Result<Self> {
        let root = match std::env::var_os("CMDQ_HOME") {
            Some(home) => PathBuf::from(home),
            None => dirs::cache_dir()
                .context("could not determine a cache directory; set CMDQ_HOME")?
                .join("cmdq"),
        };
        Ok(Self { root })
    }

    #[cfg(test)]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn queues_dpath(&self) -> PathBuf {
        self.root.join("queues")
    }

    pub fn runs_dpath(&self) -> PathBuf {
        self.root.join("runs")
    }

    fn queue_fpath(&self, name: &str) -> PathBuf {
        self.queues_dpath().join(format!("{}.json", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.queue_fpath(name).is_file()
    }

    pub fn save(&self, queue: &StoredQueue) -> Result<()> {
        std::fs::create_dir_all(self.queues_dpath())
            .with_context(|| format!("creating {}", self.queues_dpath().display()))?;
        let fpath = self.queue_fpath(&queue.name);
        let text = serde_json::to_string_pretty(queue)?;
        std::fs::write(&fpath, text).with_context(|| format!("writing {}", fpath.display()))?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<StoredQueue> {
        let fpath = self.queue_fpath(name);
        if !fpath.is_file() {
            bail!("no queue named '{}' (try `cmdq new {}`)", name, name);
        }
        let text = std::fs::read_to_string(&fpath)
            .with_context(|| format!("reading {}", fpath.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", fpath.display()))
    }

    pub fn list(&self) -> Result<Vec<String>> {
        let dpath = self.queues_dpath();
        if !dpath.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dpath)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", s)),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
