// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for tmux-backend runs. Emission is always checked; live runs are
//! skipped on machines without tmux.

use crate::prelude::*;

#[test]
fn worker_scripts_partition_the_dag() {
    let temp = Project::empty();
    temp.cmdq()
        .args(&["new", "demo", "--backend", "tmux", "--size", "2"])
        .passes();
    for (name, deps) in [("a", vec![]), ("b", vec!["a"]), ("c", vec!["b"])] {
        let mut args = vec!["submit", "demo", "--name", name];
        for dep in &deps {
            args.push("--depends");
            args.push(dep);
        }
        args.extend(["--", "true"]);
        temp.cmdq().args(&args).passes();
    }
    for name in ["d", "e", "f"] {
        temp.cmdq()
            .args(&["submit", "demo", "--name", name, "--", "true"])
            .passes();
    }

    let stdout = temp
        .cmdq()
        .args(&["show", "demo", "--commands"])
        .passes()
        .stdout();

    // Two worker scripts plus a bookkeeper.
    assert_eq!(stdout.matches("cmdq worker").count(), 2);
    assert!(stdout.contains("cmdq bookkeeper"));
    assert!(stdout.contains("TOTAL=6"));
}

#[test]
#[serial_test::serial]
fn diamond_with_failing_branch_runs_under_tmux() {
    if !tmux_available() {
        eprintln!("skipping: tmux not available");
        return;
    }
    let temp = Project::empty();
    let queue = format!("tq{}", std::process::id());
    temp.cmdq()
        .args(&["new", &queue, "--backend", "tmux", "--size", "2"])
        .passes();
    temp.cmdq()
        .args(&["submit", &queue, "--name", "a", "--", "true"])
        .passes();
    temp.cmdq()
        .args(&["submit", &queue, "--name", "b", "--depends", "a", "--", "true"])
        .passes();
    temp.cmdq()
        .args(&["submit", &queue, "--name", "c", "--depends", "a", "--", "false"])
        .passes();
    temp.cmdq()
        .args(&[
            "submit", &queue, "--name", "d", "--depends", "b", "--depends", "c", "--", "true",
        ])
        .passes();

    temp.cmdq()
        .args(&["run", &queue])
        .fails_with(1)
        .stdout_has("c: failed")
        .stdout_has("d: skipped");

    temp.cmdq()
        .args(&["show", &queue])
        .passes()
        .stdout_has("a [passed]")
        .stdout_has("b [passed]")
        .stdout_has("c [failed]")
        .stdout_has("d [skipped]");
}

#[test]
#[serial_test::serial]
fn cleanup_reports_killed_sessions() {
    if !tmux_available() {
        eprintln!("skipping: tmux not available");
        return;
    }
    let temp = Project::empty();
    temp.cmdq()
        .args(&["cleanup"])
        .passes()
        .stdout_has("cmdq session(s)");
}
