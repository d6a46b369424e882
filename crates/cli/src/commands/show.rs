// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cmdq show` - inspect a queue

use anyhow::{Context, Result};
use clap::Args;
use cmdq_backends::state;
use cmdq_core::{GraphModel, SessionDir, SessionId};

use crate::store::Store;

#[derive(Args)]
pub struct ShowArgs {
    /// Queue name
    pub queue: String,
    /// Print the generated scripts instead of the job table
    #[arg(long)]
    pub commands: bool,
    /// Only show jobs carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
}

pub fn handle(args: ShowArgs) -> Result<()> {
    let store = Store::open()?;
    let stored = store.load(&args.queue)?;

    if args.commands {
        let queue = stored.to_queue(&store)?;
        queue.print_commands()?;
        return Ok(());
    }

    let model = GraphModel::from_jobs(&stored.name, stored.jobs.iter().cloned())
        .with_context(|| format!("queue '{}' is inconsistent", stored.name))?;

    println!(
        "queue '{}' ({}, {} jobs)",
        stored.name,
        stored.backend,
        model.len()
    );

    let session_dir = stored.last_session.as_ref().map(|session| {
        let dpath = stored.dpath.clone().unwrap_or_else(|| store.runs_dpath());
        SessionDir::new(&dpath, SessionId::new(session.clone()))
    });
    if let Some(dir) = &session_dir {
        println!("last session: {}", dir.session());
    }

    let selected = model
        .jobs()
        .filter(|job| args.tag.as_deref().is_none_or(|tag| job.has_tag(tag)));
    for job in selected {
        let state = match &session_dir {
            Some(dir) => format!(" [{}]", state::read_job_state(dir, &job.name)),
            None => String::new(),
        };
        let depends = if job.depends.is_empty() {
            String::new()
        } else {
            format!(" <- {}", job.depends.join(", "))
        };
        let tags = if job.tags.is_empty() {
            String::new()
        } else {
            format!(
                " #{}",
                job.tags.iter().cloned().collect::<Vec<_>>().join(" #")
            )
        };
        println!("  {}{}{}{}: {}", job.name, state, depends, tags, job.command);
    }
    Ok(())
}
