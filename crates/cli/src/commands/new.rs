// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cmdq new` - create a queue

use anyhow::{bail, Result};
use clap::Args;
use cmdq_backends::BackendKind;
use std::path::PathBuf;

use crate::store::{parse_key_value, Store, StoredQueue};

#[derive(Args)]
pub struct NewArgs {
    /// Queue name
    pub name: String,
    /// Execution backend
    #[arg(long, default_value = "serial")]
    pub backend: BackendKind,
    /// Directory for session directories (default: under the cmdq cache)
    #[arg(long)]
    pub dpath: Option<PathBuf>,
    /// Tmux worker count
    #[arg(long, default_value_t = 2)]
    pub size: usize,
    /// Environment exported at the top of every generated script
    /// (can be repeated: --env KEY=VALUE)
    #[arg(long = "env", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,
    /// One-time setup command emitted before any job (can be repeated)
    #[arg(long = "header")]
    pub header: Vec<String>,
}

pub fn handle(args: NewArgs) -> Result<()> {
    let store = Store::open()?;
    if store.exists(&args.name) {
        bail!("queue '{}' already exists", args.name);
    }
    store.save(&StoredQueue {
        name: args.name.clone(),
        backend: args.backend,
        dpath: args.dpath,
        size: args.size,
        environ: args.env,
        header_commands: args.header,
        jobs: Vec::new(),
        last_session: None,
    })?;
    println!("created queue '{}' ({})", args.name, args.backend);
    Ok(())
}
