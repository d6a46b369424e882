// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cmdq run` - finalize, write, and execute a queue

use anyhow::Result;
use clap::Args;
use cmdq_backends::RunOptions;
use cmdq_core::JobState;

use crate::exit_error::ExitError;
use crate::store::Store;

#[derive(Args)]
pub struct RunArgs {
    /// Queue name
    pub queue: String,
    /// Return immediately after spawning instead of waiting
    #[arg(long)]
    pub no_block: bool,
    /// Print a progress line per poll tick while waiting
    #[arg(long)]
    pub verbose: bool,
}

pub async fn handle(args: RunArgs) -> Result<()> {
    let store = Store::open()?;
    let mut stored = store.load(&args.queue)?;
    let queue = stored.to_queue(&store)?;

    let opts = RunOptions {
        block: !args.no_block,
        verbose: args.verbose,
        ..RunOptions::default()
    };
    tracing::info!(
        queue = %stored.name,
        session = %queue.session_dir().session(),
        "starting run"
    );
    let outcome = queue.run(&opts).await?;

    stored.last_session = Some(queue.session_dir().session().to_string());
    store.save(&stored)?;

    if !opts.block {
        println!(
            "spawned session {} (not waiting)",
            queue.session_dir().session()
        );
        return Ok(());
    }

    println!("{}", outcome.snapshot.progress_line());
    for job in &outcome.snapshot.jobs {
        if job.state != JobState::Passed {
            println!("  {}: {}", job.name, job.state);
        }
    }
    println!("session directory: {}", queue.session_dir().root().display());

    if !outcome.success() {
        return Err(ExitError::code(outcome.exit_code()).into());
    }
    Ok(())
}
