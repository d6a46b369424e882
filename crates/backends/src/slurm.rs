// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slurm backend: an `sbatch` driver script.
//!
//! One `sbatch` call per job, in topological order, each captured into a
//! `JOB_<NNN>` shell variable so later calls can wire dependency edges as
//! `--dependency=afterok:${JOB_...}`. Ordering guarantees every variable
//! is defined before it is referenced. Submitted ids are appended to a
//! file under `job_info` so `kill` can `scancel` them later.

use crate::error::BackendError;
use crate::queue::{Artifact, EmitContext, Queue, RunOptions, RunOutcome, ScriptFile};
use crate::state::StateSnapshot;
use cmdq_bash::{sh_quote, sh_quote_path, ScriptBuilder};
use cmdq_core::{Job, JobState, JobStatus};
use std::collections::HashMap;

/// Options for the slurm backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurmOptions {
    pub shebang: String,
    /// Extra flags appended verbatim to every `sbatch` call. The built-in
    /// flag set is the supported minimum; slurm grows and renames flags
    /// across releases, so anything else passes through here.
    pub extra_args: Vec<String>,
}

impl Default for SlurmOptions {
    fn default() -> Self {
        Self {
            shebang: "#!/bin/bash".to_string(),
            extra_args: Vec::new(),
        }
    }
}

pub(crate) fn emit(ordered: &[&Job], ctx: &EmitContext<'_>, opts: &SlurmOptions) -> Artifact {
    let mut builder = ScriptBuilder::new()
        .shebang(opts.shebang.clone())
        .comment(format!(
            "cmdq slurm driver - queue {} - session {}",
            ctx.queue_name,
            ctx.session_dir.session()
        ))
        .exports(ctx.environ.iter().cloned())
        .mkdir(ctx.session_dir.job_info_dpath())
        .mkdir(ctx.session_dir.logs_dpath());
    for command in ctx.header_commands {
        builder = builder.header_command(command.clone());
    }

    let var_of: HashMap<&str, String> = ordered
        .iter()
        .enumerate()
        .map(|(i, job)| (job.name.as_str(), format!("JOB_{:03}", i)))
        .collect();

    for job in ordered {
        let var = &var_of[job.name.as_str()];
        builder = builder.section(sbatch_call(job, var, &var_of, ctx, opts));
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

fn sbatch_call(
    job: &Job,
    var: &str,
    var_of: &HashMap<&str, String>,
    ctx: &EmitContext<'_>,
    opts: &SlurmOptions,
) -> String {
    let paths = ctx.session_dir.job_paths(&job.name);
    let mut flags = vec![format!("--job-name=\"{}\"", job.name)];
    if let Some(cpus) = job.hints.cpus {
        flags.push(format!("--cpus-per-task={}", cpus));
    }
    if let Some(mem) = job.hints.mem {
        flags.push(format!("--mem={}", mem.megabytes()));
    }
    if let Some(gpus) = job.hints.gpus {
        flags.push(format!("--gpus={}", gpus));
    }
    if let Some(partition) = &job.hints.partition {
        flags.push(format!("--partition={}", sh_quote(partition)));
    }
    if let Some(begin) = &job.hints.begin {
        flags.push(format!("--begin={}", sh_quote(begin)));
    }
    flags.push(format!("--output=\"{}\"", paths.log_fpath.display()));
    if !job.depends.is_empty() {
        let refs: Vec<String> = job
            .depends
            .iter()
            .filter_map(|dep| var_of.get(dep.as_str()))
            .map(|v| format!("${{{}}}", v))
            .collect();
        flags.push(format!("\"--dependency=afterok:{}\"", refs.join(":")));
    }
    flags.extend(opts.extra_args.iter().cloned());
    flags.push(format!("--wrap {}", sh_quote(&job.command)));
    flags.push("--parsable".to_string());

    format!(
        "{var}=$(sbatch {flags})\necho \"${{{var}}}\" >> {ids}",
        var = var,
        flags = flags.join(" \\\n    "),
        ids = sh_quote_path(&ctx.session_dir.slurm_ids_fpath()),
    )
}

pub(crate) async fn run(
    artifact: &Artifact,
    queue: &Queue,
    opts: &RunOptions,
) -> Result<RunOutcome, BackendError> {
    let entry = artifact
        .entry
        .as_deref()
        .ok_or_else(|| BackendError::Exec("slurm artifact has no driver script".into()))?;

    let mut cmd = tokio::process::Command::new("bash");
    cmd.arg(entry);
    if opts.capture {
        cmd.stdout(std::process::Stdio::piped());
    }
    let child = cmd.spawn().map_err(|source| BackendError::Spawn {
        command: "bash".into(),
        source,
    })?;

    // Blocking waits for submission, not completion; the slurm controller
    // owns execution from here.
    let output = child.wait_with_output().await?;
    let captured = opts
        .capture
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned());
    tracing::info!(
        session = %queue.session_dir().session(),
        "sbatch driver finished submitting"
    );
    Ok(RunOutcome {
        snapshot: read_state(queue).await,
        captured,
        child_pid: None,
    })
}

/// True iff `sinfo` reports at least one usable node.
pub(crate) async fn is_available() -> bool {
    let output = tokio::process::Command::new("sinfo")
        .args(["-h", "-o", "%t"])
        .output()
        .await;
    match output {
        Ok(out) if out.status.success() => {
            parse_sinfo_availability(&String::from_utf8_lossy(&out.stdout))
        }
        _ => false,
    }
}

pub(crate) async fn sbatch_on_path() -> bool {
    tokio::process::Command::new("sbatch")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Parse `sinfo -h -o %t` output: one node-state token per line.
///
/// State tokens grew trailing markers over slurm releases (`down*`,
/// `drain~`, `idle#`); strip them before deciding. Usable means anything
/// not down or draining.
pub fn parse_sinfo_availability(output: &str) -> bool {
    output.lines().any(|line| {
        let state = line
            .trim()
            .trim_end_matches(['*', '~', '#', '!', '%', '$', '@', '+', '-'])
            .to_ascii_lowercase();
        !state.is_empty() && !state.starts_with("down") && !state.starts_with("drain") && !state.starts_with("drng")
    })
}

/// Map a squeue/sacct state token to a job state.
///
/// Accepts both compact (`PD`) and long (`PENDING`) spellings; sacct
/// suffixes like `CANCELLED by 1000` are handled by the caller splitting
/// on whitespace first.
pub fn map_scheduler_state(token: &str) -> Option<JobState> {
    match token.trim().to_ascii_uppercase().as_str() {
        "PD" | "PENDING" | "CF" | "CONFIGURING" => Some(JobState::Pending),
        "R" | "RUNNING" | "CG" | "COMPLETING" => Some(JobState::Started),
        "CD" | "COMPLETED" => Some(JobState::Passed),
        "F" | "FAILED" | "TO" | "TIMEOUT" | "CA" | "CANCELLED" | "NF" | "NODE_FAIL"
        | "OOM" | "OUT_OF_MEMORY" => Some(JobState::Failed),
        _ => None,
    }
}

/// Parse `squeue --me -h --format="%i %j %T"` lines into name -> state.
pub fn parse_squeue(output: &str) -> HashMap<String, JobState> {
    let mut states = HashMap::new();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(_id), Some(name), Some(token)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        if let Some(state) = map_scheduler_state(token) {
            states.insert(name.to_string(), state);
        }
    }
    states
}

/// Parse `sacct -n -P --format=JobName,State` lines into name -> state.
pub fn parse_sacct(output: &str) -> HashMap<String, JobState> {
    let mut states = HashMap::new();
    for line in output.lines() {
        let mut parts = line.split('|');
        let (Some(name), Some(state_field)) = (parts.next(), parts.next()) else {
            continue;
        };
        let token = state_field.split_whitespace().next().unwrap_or("");
        if let Some(state) = map_scheduler_state(token) {
            // squeue is fresher; sacct only fills completed jobs in.
            states.entry(name.to_string()).or_insert(state);
        }
    }
    states
}

/// Snapshot job states from the scheduler, falling back to pending for
/// anything neither squeue nor sacct knows about.
pub(crate) async fn read_state(queue: &Queue) -> StateSnapshot {
    let mut states: HashMap<String, JobState> = HashMap::new();

    let squeue = tokio::process::Command::new("squeue")
        .args(["--me", "-h", "--format=%i %j %T"])
        .output()
        .await;
    if let Ok(out) = squeue {
        if out.status.success() {
            states.extend(parse_squeue(&String::from_utf8_lossy(&out.stdout)));
        }
    }

    let sacct = tokio::process::Command::new("sacct")
        .args(["-n", "-P", "--format=JobName,State"])
        .output()
        .await;
    if let Ok(out) = sacct {
        if out.status.success() {
            for (name, state) in parse_sacct(&String::from_utf8_lossy(&out.stdout)) {
                states.entry(name).or_insert(state);
            }
        }
    }

    StateSnapshot {
        jobs: queue
            .job_names()
            .map(|name| {
                JobStatus::new(
                    name,
                    states.get(name).copied().unwrap_or(JobState::Pending),
                )
            })
            .collect(),
    }
}

/// `scancel` every id the driver recorded.
pub(crate) async fn cancel(queue: &Queue) -> Result<(), BackendError> {
    let ids_fpath = queue.session_dir().slurm_ids_fpath();
    let Ok(text) = std::fs::read_to_string(&ids_fpath) else {
        return Ok(());
    };
    let ids: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if ids.is_empty() {
        return Ok(());
    }
    let output = tokio::process::Command::new("scancel")
        .args(&ids)
        .output()
        .await
        .map_err(|source| BackendError::Spawn {
            command: "scancel".into(),
            source,
        })?;
    if !output.status.success() {
        tracing::warn!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "scancel reported an error"
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "slurm_tests.rs"]
mod tests;
