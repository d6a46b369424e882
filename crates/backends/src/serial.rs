// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serial backend: the whole DAG as one self-checking bash script.
//!
//! Jobs run in topological order with no parallelism; each block's guard
//! decides from status files alone, so a failed ancestor skips its whole
//! subtree while unrelated jobs keep running. The script always exits
//! zero; failure is aggregated from `.fail` files afterwards.

use crate::error::BackendError;
use crate::queue::{Artifact, EmitContext, Queue, RunOptions, RunOutcome, ScriptFile};
use cmdq_bash::{DependProbe, JobBlock, ScriptBuilder};
use cmdq_core::Job;
use std::path::Path;

/// Options for the serial backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialOptions {
    pub shebang: String,
    /// Serialize every job under `flock` on the session lockfile. Off by
    /// default; jobs own disjoint status files and need no locking.
    pub with_locks: bool,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            shebang: "#!/bin/bash".to_string(),
            with_locks: false,
        }
    }
}

pub(crate) fn emit(ordered: &[&Job], ctx: &EmitContext<'_>, opts: &SerialOptions) -> Artifact {
    let total = ordered.len();
    let mut builder = ScriptBuilder::new()
        .shebang(opts.shebang.clone())
        .comment(format!(
            "Autogenerated by cmdq - queue {} - session {}",
            ctx.queue_name,
            ctx.session_dir.session()
        ))
        .exports(ctx.environ.iter().cloned())
        .mkdir(ctx.session_dir.job_info_dpath())
        .mkdir(ctx.session_dir.logs_dpath());
    for command in ctx.header_commands {
        builder = builder.header_command(command.clone());
    }

    for (i, job) in ordered.iter().enumerate() {
        let mut block = JobBlock::new(job, i + 1, total, ctx.session_dir.job_paths(&job.name));
        block.depends = job
            .depends
            .iter()
            .map(|dep| DependProbe::local(ctx.session_dir.job_paths(dep)))
            .collect();
        block.options.with_locks = opts.with_locks;
        block.lock_fpath = Some(ctx.session_dir.lock_fpath());
        builder = builder.section(block.render());
    }

    let entry = ctx.session_dir.entry_fpath();
    Artifact {
        scripts: vec![ScriptFile {
            fpath: entry.clone(),
            text: builder.build(),
        }],
        entry: Some(entry),
    }
}

pub(crate) async fn run(
    artifact: &Artifact,
    queue: &Queue,
    opts: &RunOptions,
) -> Result<RunOutcome, BackendError> {
    let entry = artifact
        .entry
        .as_deref()
        .ok_or_else(|| BackendError::Exec("serial artifact has no entry script".into()))?;

    if opts.system {
        // Replaces the current process; only returns on failure.
        return exec_inline(entry);
    }

    let mut cmd = tokio::process::Command::new("bash");
    cmd.arg(entry);
    if opts.capture {
        cmd.stdout(std::process::Stdio::piped());
    }
    let child = cmd.spawn().map_err(|source| BackendError::Spawn {
        command: "bash".into(),
        source,
    })?;

    if !opts.block {
        let child_pid = child.id();
        tracing::debug!(pid = ?child_pid, "serial run detached");
        return Ok(RunOutcome {
            snapshot: queue.read_state(),
            captured: None,
            child_pid,
        });
    }

    let output = child.wait_with_output().await?;
    let captured = opts
        .capture
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned());
    let snapshot = queue.read_state();
    if opts.verbose {
        println!("{}", snapshot.progress_line());
    }
    tracing::info!(
        session = %queue.session_dir().session(),
        progress = %snapshot.progress_line(),
        "serial run finished"
    );
    Ok(RunOutcome {
        snapshot,
        captured,
        child_pid: None,
    })
}

#[cfg(unix)]
fn exec_inline(entry: &Path) -> Result<RunOutcome, BackendError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let program = CString::new("bash").map_err(|e| BackendError::Exec(e.to_string()))?;
    let script = CString::new(entry.as_os_str().as_bytes())
        .map_err(|e| BackendError::Exec(e.to_string()))?;
    let err = nix::unistd::execvp(&program, &[program.clone(), script])
        .err()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "execvp returned".into());
    Err(BackendError::Exec(err))
}

#[cfg(not(unix))]
fn exec_inline(_entry: &Path) -> Result<RunOutcome, BackendError> {
    Err(BackendError::Exec(
        "inline exec is only supported on unix".into(),
    ))
}

#[cfg(test)]
#[path = "serial_tests.rs"]
mod tests;
