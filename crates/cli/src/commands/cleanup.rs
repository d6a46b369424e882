// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cmdq cleanup` - kill all cmdq tmux sessions

use anyhow::Result;

pub async fn handle() -> Result<()> {
    let killed = cmdq_backends::tmux::cleanup_all().await?;
    println!("killed {} cmdq session(s)", killed);
    Ok(())
}
