// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cmdq list` - list stored queues

use anyhow::Result;

use crate::store::Store;

pub fn handle() -> Result<()> {
    let store = Store::open()?;
    let names = store.list()?;
    if names.is_empty() {
        println!("no queues (try `cmdq new <name>`)");
        return Ok(());
    }
    for name in names {
        match store.load(&name) {
            Ok(stored) => println!(
                "{} ({}, {} jobs)",
                stored.name,
                stored.backend,
                stored.jobs.len()
            ),
            Err(_) => println!("{} (unreadable)", name),
        }
    }
    Ok(())
}
