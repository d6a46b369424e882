// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue: a job graph bound to one execution backend.
//!
//! Finalization is pure (graph + options in, script text out); `write`
//! materializes the session directory; `run` executes. Backends are a
//! closed tagged variant rather than an open hierarchy, so adding one is
//! a compile-checked change to this enum.

use crate::error::BackendError;
use crate::serial::SerialOptions;
use crate::slurm::SlurmOptions;
use crate::state::StateSnapshot;
use crate::tmux::TmuxOptions;
use crate::{serial, slurm, state, tmux};
use cmdq_core::{Clock, GraphModel, Job, JobSpec, QueueError, SessionDir, SessionId};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which backend a queue targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Serial,
    Tmux,
    Slurm,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Serial => "serial",
            BackendKind::Tmux => "tmux",
            BackendKind::Slurm => "slurm",
        })
    }
}

impl FromStr for BackendKind {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(BackendKind::Serial),
            "tmux" => Ok(BackendKind::Tmux),
            "slurm" => Ok(BackendKind::Slurm),
            _ => Err(QueueError::UnknownBackend {
                kind: s.to_string(),
            }),
        }
    }
}

/// A backend plus its options.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Serial(SerialOptions),
    Tmux(TmuxOptions),
    Slurm(SlurmOptions),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Serial(_) => BackendKind::Serial,
            Backend::Tmux(_) => BackendKind::Tmux,
            Backend::Slurm(_) => BackendKind::Slurm,
        }
    }

    /// Default options for a kind.
    pub fn from_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Serial => Backend::Serial(SerialOptions::default()),
            BackendKind::Tmux => Backend::Tmux(TmuxOptions::default()),
            BackendKind::Slurm => Backend::Slurm(SlurmOptions::default()),
        }
    }
}

/// One generated script: where it goes and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub fpath: PathBuf,
    pub text: String,
}

/// The finalized artifact for one session, before or after materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub scripts: Vec<ScriptFile>,
    /// Script `run` invokes directly. The tmux backend has no single
    /// entry; its workers are spawned individually.
    pub entry: Option<PathBuf>,
}

/// Knobs for one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Wait for every job to reach a terminal state.
    pub block: bool,
    /// Replace the current process with the entry script (serial only;
    /// never returns on success).
    pub system: bool,
    /// Buffer the entry script's stdout into the outcome.
    pub capture: bool,
    /// Print a progress line per poll tick while blocking.
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            block: true,
            system: false,
            capture: false,
            verbose: false,
        }
    }
}

/// What came back from a `run`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub snapshot: StateSnapshot,
    pub captured: Option<String>,
    /// Pid of the detached child when `block=false`.
    pub child_pid: Option<u32>,
}

impl RunOutcome {
    /// Success means no job failed. The generated script's own exit status
    /// is always zero by design and never consulted.
    pub fn success(&self) -> bool {
        !self.snapshot.any_failed()
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// A job graph bound to a backend and a session directory.
#[derive(Debug, Clone)]
pub struct Queue {
    model: GraphModel,
    backend: Backend,
    dpath: PathBuf,
    session_dir: SessionDir,
    environ: Vec<(String, String)>,
    header_commands: Vec<String>,
}

impl Queue {
    pub fn new(
        name: impl Into<String>,
        backend: Backend,
        dpath: impl Into<PathBuf>,
        clock: &impl Clock,
    ) -> Self {
        let model = GraphModel::new(name);
        let dpath = dpath.into();
        let session = SessionId::generate(model.name(), clock);
        let session_dir = SessionDir::new(&dpath, session);
        Self {
            model,
            backend,
            dpath,
            session_dir,
            environ: Vec::new(),
            header_commands: Vec::new(),
        }
    }

    /// Rebuild a queue around an existing model (queue-store loading).
    pub fn from_model(
        model: GraphModel,
        backend: Backend,
        dpath: impl Into<PathBuf>,
        clock: &impl Clock,
    ) -> Self {
        let dpath = dpath.into();
        let session = SessionId::generate(model.name(), clock);
        let session_dir = SessionDir::new(&dpath, session);
        Self {
            model,
            backend,
            dpath,
            session_dir,
            environ: Vec::new(),
            header_commands: Vec::new(),
        }
    }

    /// Pin the session id (deterministic paths in tests).
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session_dir = SessionDir::new(&self.dpath, session);
        self
    }

    pub fn environ<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environ
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// One-time setup command emitted before any job in every script.
    pub fn header_command(mut self, v: impl Into<String>) -> Self {
        self.header_commands.push(v.into());
        self
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn session_dir(&self) -> &SessionDir {
        &self.session_dir
    }

    pub fn submit(&mut self, spec: JobSpec) -> Result<&Job, QueueError> {
        self.model.submit(spec)
    }

    /// Same jobs, different backend, fresh session. The original queue is
    /// unaffected.
    pub fn change_backend(&self, backend: Backend, clock: &impl Clock) -> Queue {
        let mut queue = Queue::from_model(self.model.clone(), backend, &self.dpath, clock);
        queue.environ = self.environ.clone();
        queue.header_commands = self.header_commands.clone();
        queue
    }

    /// Transpile the graph into script text. Pure: no filesystem effects.
    pub fn finalize_text(&self) -> Result<Artifact, QueueError> {
        let ordered = self.model.order_jobs()?;
        let ctx = EmitContext {
            queue_name: self.model.name(),
            session_dir: &self.session_dir,
            environ: &self.environ,
            header_commands: &self.header_commands,
        };
        Ok(match &self.backend {
            Backend::Serial(opts) => serial::emit(&ordered, &ctx, opts),
            Backend::Tmux(opts) => tmux::emit(&ordered, &ctx, opts),
            Backend::Slurm(opts) => slurm::emit(&ordered, &ctx, opts),
        })
    }

    /// Print the finalized scripts to stdout for inspection.
    pub fn print_commands(&self) -> Result<(), QueueError> {
        let artifact = self.finalize_text()?;
        for file in &artifact.scripts {
            println!("# === {}", file.fpath.display());
            println!("{}", file.text);
        }
        Ok(())
    }

    /// Materialize the session directory and scripts.
    ///
    /// Graph problems and unwritable directories fail before the first
    /// script lands on disk.
    pub fn write(&self) -> Result<Artifact, BackendError> {
        let artifact = self.finalize_text()?;
        for dpath in [
            self.session_dir.root().to_path_buf(),
            self.session_dir.job_info_dpath(),
            self.session_dir.logs_dpath(),
        ] {
            std::fs::create_dir_all(&dpath).map_err(|source| BackendError::SessionDir {
                path: dpath.clone(),
                source,
            })?;
        }
        for file in &artifact.scripts {
            std::fs::write(&file.fpath, &file.text)?;
            set_executable(&file.fpath)?;
        }
        tracing::debug!(
            session = %self.session_dir.session(),
            scripts = artifact.scripts.len(),
            "materialized session directory"
        );
        Ok(artifact)
    }

    /// Whether the backend's infrastructure is usable right now.
    pub async fn is_available(&self) -> bool {
        match &self.backend {
            Backend::Serial(_) => true,
            Backend::Tmux(_) => tmux::tmux_available().await,
            Backend::Slurm(_) => slurm::is_available().await,
        }
    }

    /// Finalize, materialize, and execute.
    pub async fn run(&self, opts: &RunOptions) -> Result<RunOutcome, BackendError> {
        match &self.backend {
            Backend::Serial(_) => {
                let artifact = self.write()?;
                serial::run(&artifact, self, opts).await
            }
            Backend::Tmux(tmux_opts) => {
                if !tmux::tmux_available().await {
                    return Err(BackendError::MissingCommand {
                        command: "tmux".into(),
                    });
                }
                tmux::handle_other_sessions(self, tmux_opts).await?;
                let artifact = self.write()?;
                tmux::run(&artifact, self, tmux_opts, opts).await
            }
            Backend::Slurm(_) => {
                if !slurm::sbatch_on_path().await {
                    return Err(BackendError::MissingCommand {
                        command: "sbatch".into(),
                    });
                }
                let artifact = self.write()?;
                slurm::run(&artifact, self, opts).await
            }
        }
    }

    /// Snapshot job states from the session's status files.
    pub fn read_state(&self) -> StateSnapshot {
        state::read_state(&self.session_dir, self.job_names())
    }

    /// Snapshot job states, consulting the scheduler for slurm queues.
    pub async fn read_backend_state(&self) -> StateSnapshot {
        match &self.backend {
            Backend::Slurm(_) => slurm::read_state(self).await,
            _ => self.read_state(),
        }
    }

    /// Terminate whatever this session started.
    pub async fn kill(&self) -> Result<(), BackendError> {
        match &self.backend {
            Backend::Serial(_) => Ok(()),
            Backend::Tmux(_) => tmux::kill(self).await,
            Backend::Slurm(_) => slurm::cancel(self).await,
        }
    }

    pub(crate) fn job_names(&self) -> impl Iterator<Item = &str> {
        self.model.jobs().map(|j| j.name.as_str())
    }
}

/// Shared emission inputs passed to each backend.
pub(crate) struct EmitContext<'a> {
    pub queue_name: &'a str,
    pub session_dir: &'a SessionDir,
    pub environ: &'a [(String, String)],
    pub header_commands: &'a [String],
}

#[cfg(unix)]
fn set_executable(fpath: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(fpath, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_fpath: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
