// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cmdq_core::SessionId;
use std::path::Path;

fn render(total: usize, rate: f64) -> String {
    let dir = SessionDir::new(Path::new("/s"), SessionId::new("sess"));
    BookkeeperScript {
        session_dir: &dir,
        total_jobs: total,
        refresh_rate: rate,
    }
    .render()
}

#[test]
fn counts_all_three_terminal_states() {
    let text = render(5, 0.4);
    assert!(text.contains("*.pass"));
    assert!(text.contains("*.fail"));
    assert!(text.contains("grep -ls '^skipped'"));
    assert!(text.contains("TOTAL=5"));
}

#[test]
fn exits_when_everything_is_terminal() {
    let text = render(3, 0.4);
    assert!(text.contains("if [ \"$finished\" -ge \"$TOTAL\" ]; then"));
    assert!(text.contains("break"));
}

#[test]
fn refresh_rate_is_the_sleep_interval() {
    assert!(render(1, 0.4).contains("sleep 0.4"));
    assert!(render(1, 2.0).contains("sleep 2"));
}

#[test]
fn writes_no_status_files() {
    let text = render(2, 0.4);
    assert!(!text.contains("touch"));
    assert!(!text.contains(".stat\""));
}
