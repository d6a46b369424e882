// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for serial-backend runs through the binary.

use crate::prelude::*;

fn submit(temp: &Project, queue: &str, name: &str, depends: &[&str], command: &str) {
    let mut args = vec!["submit", queue, "--name", name];
    for dep in depends {
        args.push("--depends");
        args.push(dep);
    }
    args.push("--");
    args.extend(command.split(' '));
    temp.cmdq().args(&args).passes();
}

#[test]
fn linear_chain_passes() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    submit(&temp, "demo", "a", &[], "echo A");
    submit(&temp, "demo", "b", &["a"], "echo B");
    submit(&temp, "demo", "c", &["b"], "echo C");

    temp.cmdq()
        .args(&["run", "demo"])
        .passes()
        .stdout_has("3/3 finished (passed=3 failed=0 skipped=0)");

    let stdout = temp.cmdq().args(&["show", "demo"]).passes().stdout();
    for job in ["a", "b", "c"] {
        assert!(
            stdout.contains(&format!("{} [passed]", job)),
            "show output: {}",
            stdout
        );
    }
}

#[test]
fn failure_skips_descendants_and_sets_exit_code() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    submit(&temp, "demo", "a", &[], "false");
    submit(&temp, "demo", "b", &["a"], "echo B");
    submit(&temp, "demo", "c", &[], "echo C");

    temp.cmdq()
        .args(&["run", "demo"])
        .fails_with(1)
        .stdout_has("a: failed")
        .stdout_has("b: skipped");

    temp.cmdq()
        .args(&["show", "demo"])
        .passes()
        .stdout_has("a [failed]")
        .stdout_has("b [skipped]")
        .stdout_has("c [passed]");
}

#[test]
fn each_run_gets_a_fresh_session_directory() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    submit(&temp, "demo", "a", &[], "true");

    temp.cmdq().args(&["run", "demo"]).passes();
    temp.cmdq().args(&["run", "demo"]).passes();

    let runs = temp.home().join("runs");
    let sessions: Vec<_> = std::fs::read_dir(&runs)
        .unwrap_or_else(|e| panic!("runs dir: {}", e))
        .collect();
    assert_eq!(sessions.len(), 2);
}

#[test]
fn show_commands_prints_the_script_without_running() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    submit(&temp, "demo", "a", &[], "echo hello");

    temp.cmdq()
        .args(&["show", "demo", "--commands"])
        .passes()
        .stdout_has("#!/bin/bash")
        .stdout_has("### Command 1/1 - a")
        .stdout_has("echo hello");

    // Printing is pure: nothing materialized.
    assert!(!temp.home().join("runs").exists());
}
