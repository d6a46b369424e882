// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cmdq submit` - add a job to a queue

use anyhow::{Context, Result};
use clap::Args;
use cmdq_core::{GraphModel, JobSpec, MemSize};

use crate::store::Store;

#[derive(Args)]
pub struct SubmitArgs {
    /// Queue name
    pub queue: String,
    /// Job name (default: auto-generated)
    #[arg(long)]
    pub name: Option<String>,
    /// Jobs that must pass first (can be repeated)
    #[arg(long = "depends")]
    pub depends: Vec<String>,
    /// Tag for emit-time filtering (can be repeated)
    #[arg(long = "tag")]
    pub tag: Vec<String>,
    /// CPU hint
    #[arg(long)]
    pub cpus: Option<u32>,
    /// GPU hint
    #[arg(long)]
    pub gpus: Option<u32>,
    /// Memory hint, e.g. 8GB or 512MB
    #[arg(long)]
    pub mem: Option<MemSize>,
    /// Scheduler partition hint
    #[arg(long)]
    pub partition: Option<String>,
    /// Deferred start hint, passed to `sbatch --begin`
    #[arg(long)]
    pub begin: Option<String>,
    /// Tee the job's stdout/stderr into its log file
    #[arg(long)]
    pub log: bool,
    /// The shell command, after `--`
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

pub fn handle(args: SubmitArgs) -> Result<()> {
    let store = Store::open()?;
    let mut stored = store.load(&args.queue)?;

    let mut spec = JobSpec::new(args.command.join(" "))
        .depends(args.depends)
        .log(args.log);
    if let Some(name) = args.name {
        spec = spec.name(name);
    }
    for tag in args.tag {
        spec = spec.tag(tag);
    }
    if let Some(cpus) = args.cpus {
        spec = spec.cpus(cpus);
    }
    if let Some(gpus) = args.gpus {
        spec = spec.gpus(gpus);
    }
    if let Some(mem) = args.mem {
        spec = spec.mem(mem);
    }
    if let Some(partition) = args.partition {
        spec = spec.partition(partition);
    }
    if let Some(begin) = args.begin {
        spec = spec.begin(begin);
    }

    // Rebuild the model to surface duplicate names now, not at run time.
    let mut model = GraphModel::from_jobs(&stored.name, stored.jobs.iter().cloned())
        .with_context(|| format!("queue '{}' is inconsistent", stored.name))?;
    let job = model.submit(spec.clone())?;
    println!("submitted '{}' to queue '{}'", job.name, stored.name);

    stored.jobs.push(spec);
    store.save(&stored)?;
    Ok(())
}
