// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux backend: the DAG split across worker sessions.
//!
//! Each worker lane is a serial-style script in its own tmux session named
//! `cmdq_<session-id>_<k>`; cross-worker dependencies wait on the
//! dependency's status files from inside the generated bash, so no
//! supervising process is needed once the sessions are up. A bookkeeper
//! session polls the status files and prints aggregate progress until
//! every real job is terminal.

use crate::error::BackendError;
use crate::partition::partition;
use crate::queue::{Artifact, EmitContext, Queue, RunOptions, RunOutcome, ScriptFile};
use cmdq_bash::{sh_quote_path, BookkeeperScript, DependProbe, JobBlock, ScriptBuilder};
use cmdq_core::{sanitize_name, Job, SessionId};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

/// What to do with pre-existing sessions that match this queue's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherSessionHandler {
    /// Prompt on stderr; refuse to run if declined.
    Ask,
    Kill,
    Ignore,
    /// Kill when stdin is not a tty, otherwise ask.
    Auto,
}

/// Whether worker sessions stay up after one of their jobs failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFail {
    /// Workers self-exit; the session directory is the post-mortem.
    Exit,
    /// Keep the failed worker's session alive for interactive debugging.
    Linger,
}

/// Options for the tmux backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TmuxOptions {
    /// Maximum worker count; the partitioner may use fewer.
    pub size: usize,
    /// Seconds between bookkeeper/host polls.
    pub refresh_rate: f64,
    pub other_session_handler: OtherSessionHandler,
    pub onfail: OnFail,
    /// Serialize every job under `flock` on the session lockfile.
    pub with_locks: bool,
}

impl Default for TmuxOptions {
    fn default() -> Self {
        Self {
            size: 2,
            refresh_rate: 0.4,
            other_session_handler: OtherSessionHandler::Auto,
            onfail: OnFail::Exit,
            with_locks: false,
        }
    }
}

pub(crate) fn emit(ordered: &[&Job], ctx: &EmitContext<'_>, opts: &TmuxOptions) -> Artifact {
    let plan = partition(ordered, opts.size);
    let by_name: HashMap<&str, &Job> = ordered.iter().map(|j| (j.name.as_str(), *j)).collect();
    let mut scripts = Vec::new();

    for (k, lane) in plan.workers().iter().enumerate() {
        if lane.is_empty() {
            continue;
        }
        let mut builder = ScriptBuilder::new()
            .comment(format!(
                "cmdq worker {} - queue {} - session {}",
                k,
                ctx.queue_name,
                ctx.session_dir.session()
            ))
            .exports(ctx.environ.iter().cloned())
            .mkdir(ctx.session_dir.job_info_dpath())
            .mkdir(ctx.session_dir.logs_dpath());
        for command in ctx.header_commands {
            builder = builder.header_command(command.clone());
        }

        for (i, name) in lane.iter().enumerate() {
            let Some(job) = by_name.get(name.as_str()) else {
                continue;
            };
            let mut block =
                JobBlock::new(job, i + 1, lane.len(), ctx.session_dir.job_paths(name));
            block.depends = job
                .depends
                .iter()
                .map(|dep| {
                    let paths = ctx.session_dir.job_paths(dep);
                    if plan.is_cross_worker(dep, name) {
                        DependProbe::waiting(paths)
                    } else {
                        DependProbe::local(paths)
                    }
                })
                .collect();
            block.options.with_locks = opts.with_locks;
            block.lock_fpath = Some(ctx.session_dir.lock_fpath());
            builder = builder.section(block.render());
        }

        if matches!(opts.onfail, OnFail::Linger) {
            let probes: Vec<String> = lane
                .iter()
                .map(|name| {
                    format!(
                        "[ -e {} ]",
                        sh_quote_path(&ctx.session_dir.job_paths(name).fail_fpath)
                    )
                })
                .collect();
            builder = builder.section(format!(
                "# stay up for inspection when one of this worker's jobs failed\nif {}; then\n    sleep infinity\nfi",
                probes.join(" || ")
            ));
        }

        scripts.push(ScriptFile {
            fpath: ctx.session_dir.worker_fpath(ctx.queue_name, k),
            text: builder.build(),
        });
    }

    scripts.push(ScriptFile {
        fpath: ctx.session_dir.bookkeeper_fpath(ctx.queue_name),
        text: BookkeeperScript {
            session_dir: ctx.session_dir,
            total_jobs: ordered.len(),
            refresh_rate: opts.refresh_rate,
        }
        .render(),
    });

    Artifact {
        scripts,
        entry: None,
    }
}

pub(crate) async fn run(
    _artifact: &Artifact,
    queue: &Queue,
    tmux_opts: &TmuxOptions,
    run_opts: &RunOptions,
) -> Result<RunOutcome, BackendError> {
    let ordered = queue.model().order_jobs()?;
    let plan = partition(&ordered, tmux_opts.size);
    let session = queue.session_dir().session();

    for (k, lane) in plan.workers().iter().enumerate() {
        if lane.is_empty() {
            continue;
        }
        spawn_session(
            &session_name(session, &k.to_string()),
            &queue.session_dir().worker_fpath(queue.name(), k),
        )
        .await?;
    }
    spawn_session(
        &session_name(session, "bookkeeper"),
        &queue.session_dir().bookkeeper_fpath(queue.name()),
    )
    .await?;
    tracing::info!(
        session = %session,
        workers = plan.workers().iter().filter(|l| !l.is_empty()).count(),
        "tmux sessions spawned"
    );

    if !run_opts.block {
        return Ok(RunOutcome {
            snapshot: queue.read_state(),
            captured: None,
            child_pid: None,
        });
    }

    let interval = Duration::from_secs_f64(tmux_opts.refresh_rate.max(0.05));
    let own_prefix = format!("cmdq_{}_", session);
    loop {
        tokio::time::sleep(interval).await;
        let snapshot = queue.read_state();
        if run_opts.verbose {
            println!("{}", snapshot.progress_line());
        }
        if snapshot.all_terminal() {
            break;
        }
        if matching_sessions(&own_prefix).await?.is_empty() {
            tracing::warn!(
                session = %session,
                "worker sessions exited before all jobs were terminal"
            );
            break;
        }
    }

    if matches!(tmux_opts.onfail, OnFail::Exit) {
        kill(queue).await?;
    }
    Ok(RunOutcome {
        snapshot: queue.read_state(),
        captured: None,
        child_pid: None,
    })
}

/// Deal with sessions left over from earlier runs of a queue with the same
/// name, per the configured handler.
pub(crate) async fn handle_other_sessions(
    queue: &Queue,
    opts: &TmuxOptions,
) -> Result<(), BackendError> {
    let prefix = format!("cmdq_{}-", sanitize_name(queue.name()));
    let stale = matching_sessions(&prefix).await?;
    if stale.is_empty() {
        return Ok(());
    }

    let handler = match opts.other_session_handler {
        OtherSessionHandler::Auto => {
            if std::io::stdin().is_terminal() {
                OtherSessionHandler::Ask
            } else {
                OtherSessionHandler::Kill
            }
        }
        other => other,
    };

    match handler {
        OtherSessionHandler::Ignore => Ok(()),
        OtherSessionHandler::Kill => {
            tracing::info!(count = stale.len(), "killing stale tmux sessions");
            kill_sessions(&stale).await;
            Ok(())
        }
        OtherSessionHandler::Ask | OtherSessionHandler::Auto => {
            if confirm_kill(&stale) {
                kill_sessions(&stale).await;
                Ok(())
            } else {
                Err(BackendError::StaleSessions { names: stale })
            }
        }
    }
}

/// Kill every session belonging to this queue's session id.
pub(crate) async fn kill(queue: &Queue) -> Result<(), BackendError> {
    let prefix = format!("cmdq_{}_", queue.session_dir().session());
    let names = matching_sessions(&prefix).await?;
    kill_sessions(&names).await;
    Ok(())
}

/// Kill every `cmdq_*` session on the server, across all queues.
/// Returns how many were killed.
pub async fn cleanup_all() -> Result<usize, BackendError> {
    let names = matching_sessions("cmdq_").await?;
    let count = names.len();
    kill_sessions(&names).await;
    Ok(count)
}

pub(crate) fn session_name(session: &SessionId, label: &str) -> String {
    format!("cmdq_{}_{}", session, label)
}

pub(crate) async fn tmux_available() -> bool {
    tokio::process::Command::new("tmux")
        .arg("-V")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

async fn list_sessions() -> Result<Vec<String>, BackendError> {
    let output = tokio::process::Command::new("tmux")
        .args(["list-sessions", "-F", "#{session_name}"])
        .output()
        .await
        .map_err(|source| BackendError::Spawn {
            command: "tmux".into(),
            source,
        })?;
    // A non-running server reports an error; that just means no sessions.
    if !output.status.success() {
        return Ok(Vec::new());
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect())
}

pub(crate) async fn matching_sessions(prefix: &str) -> Result<Vec<String>, BackendError> {
    Ok(list_sessions()
        .await?
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect())
}

async fn spawn_session(name: &str, script: &Path) -> Result<(), BackendError> {
    let script_text = script.to_string_lossy();
    let output = tokio::process::Command::new("tmux")
        .args(["new-session", "-d", "-s", name, "bash", script_text.as_ref()])
        .output()
        .await
        .map_err(|source| BackendError::Spawn {
            command: "tmux".into(),
            source,
        })?;
    if !output.status.success() {
        return Err(BackendError::Spawn {
            command: format!("tmux new-session -s {}", name),
            source: std::io::Error::other(String::from_utf8_lossy(&output.stderr).into_owned()),
        });
    }
    tracing::debug!(session = name, "spawned tmux session");
    Ok(())
}

/// Kill sessions concurrently; individual failures are ignored (the
/// session may have self-exited between listing and killing).
async fn kill_sessions(names: &[String]) {
    let mut handles = Vec::with_capacity(names.len());
    for name in names {
        let name = name.clone();
        handles.push(tokio::spawn(async move {
            let _ = tokio::process::Command::new("tmux")
                .args(["kill-session", "-t", &name])
                .output()
                .await;
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

fn confirm_kill(names: &[String]) -> bool {
    use std::io::Write;

    eprintln!("cmdq: found existing tmux sessions for this queue:");
    for name in names {
        eprintln!("  {}", name);
    }
    eprint!("kill them and continue? [y/N] ");
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes" | "YES")
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
