// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeper script emission.
//!
//! The bookkeeper is an auxiliary tmux worker that only watches: it counts
//! terminal status files under `job_info`, prints one aggregate progress
//! line per tick, and exits once every real job is terminal. It writes no
//! status files of its own.

use crate::quote::sh_quote_path;
use crate::script::ScriptBuilder;
use cmdq_core::SessionDir;

/// Parameters for one bookkeeper script.
#[derive(Debug, Clone)]
pub struct BookkeeperScript<'a> {
    pub session_dir: &'a SessionDir,
    /// Number of non-bookkeeper jobs to wait for.
    pub total_jobs: usize,
    /// Seconds between polls.
    pub refresh_rate: f64,
}

impl BookkeeperScript<'_> {
    pub fn render(&self) -> String {
        let info = sh_quote_path(&self.session_dir.job_info_dpath());
        let body = format!(
            "\
INFO={info}
TOTAL={total}
while true; do
    passed=$(ls \"$INFO\"/*.pass 2>/dev/null | wc -l)
    failed=$(ls \"$INFO\"/*.fail 2>/dev/null | wc -l)
    skipped=$(grep -ls '^skipped' \"$INFO\"/*.stat 2>/dev/null | wc -l)
    finished=$((passed + failed + skipped))
    printf '[%s] %d/%d finished (passed=%d failed=%d skipped=%d)\\n' \\
        \"$(date +%H:%M:%S)\" \"$finished\" \"$TOTAL\" \"$passed\" \"$failed\" \"$skipped\"
    if [ \"$finished\" -ge \"$TOTAL\" ]; then
        break
    fi
    sleep {rate}
done",
            info = info,
            total = self.total_jobs,
            rate = self.refresh_rate,
        );

        ScriptBuilder::new()
            .comment(format!(
                "cmdq bookkeeper - session {}",
                self.session_dir.session()
            ))
            .section(body)
            .build()
    }
}

#[cfg(test)]
#[path = "bookkeeper_tests.rs"]
mod tests;
