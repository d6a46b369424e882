// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for queue management commands.

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    let temp = Project::empty();
    let stdout = temp.cmdq().args(&["--help"]).passes().stdout();
    for sub in ["new", "submit", "show", "run", "cleanup", "list"] {
        assert!(stdout.contains(sub), "--help missing subcommand {:?}", sub);
    }
}

#[test]
fn new_then_list_shows_the_queue() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["list"])
        .passes()
        .stdout_has("demo (serial, 0 jobs)");
}

#[test]
fn new_rejects_a_second_queue_with_the_same_name() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["new", "demo"])
        .fails_with(1)
        .stderr_has("already exists");
}

#[test]
fn new_rejects_unknown_backends() {
    let temp = Project::empty();
    temp.cmdq()
        .args(&["new", "demo", "--backend", "airflow"])
        .fails_with(2);
}

#[test]
fn submit_and_show_roundtrip() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "prep", "--", "echo", "prep"])
        .passes()
        .stdout_has("submitted 'prep'");
    temp.cmdq()
        .args(&[
            "submit", "demo", "--name", "fit", "--depends", "prep", "--", "echo", "fit",
        ])
        .passes();

    temp.cmdq()
        .args(&["show", "demo"])
        .passes()
        .stdout_has("queue 'demo' (serial, 2 jobs)")
        .stdout_has("fit")
        .stdout_has("<- prep");
}

#[test]
fn show_filters_by_tag() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "train", "--tag", "ml", "--", "true"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "fetch", "--", "true"])
        .passes();

    let stdout = temp
        .cmdq()
        .args(&["show", "demo", "--tag", "ml"])
        .passes()
        .stdout();
    assert!(stdout.contains("train"));
    assert!(!stdout.contains("fetch"));
}

#[test]
fn duplicate_job_name_is_rejected() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "x", "--", "true"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "x", "--", "false"])
        .fails_with(1)
        .stderr_has("duplicate job name");
}

#[test]
fn auto_names_follow_the_queue_name() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--", "true"])
        .passes()
        .stdout_has("submitted 'demo-job-0'");
}

#[test]
fn submit_to_missing_queue_suggests_new() {
    let temp = Project::empty();
    temp.cmdq()
        .args(&["submit", "ghost", "--", "true"])
        .fails_with(1)
        .stderr_has("cmdq new ghost");
}

#[test]
fn stored_queue_file_is_plain_json() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo", "--env", "K=V"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "a", "--", "true"])
        .passes();

    let text = std::fs::read_to_string(temp.home().join("queues/demo.json"))
        .unwrap_or_else(|e| panic!("queue file: {}", e));
    let value: serde_json::Value =
        serde_json::from_str(&text).unwrap_or_else(|e| panic!("queue json: {}", e));
    assert_eq!(value["name"], "demo");
    assert_eq!(value["backend"], "serial");
    assert_eq!(value["jobs"][0]["name"], "a");
}

#[test]
fn run_rejects_a_cycle_without_writing_anything() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "a", "--depends", "b", "--", "true"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "b", "--depends", "a", "--", "true"])
        .passes();

    temp.cmdq()
        .args(&["run", "demo"])
        .fails_with(1)
        .stderr_has("cycle");

    // No session directory materialized.
    let runs = temp.home().join("runs");
    let count = std::fs::read_dir(&runs).map(|d| d.count()).unwrap_or(0);
    assert_eq!(count, 0);
}

#[test]
fn unknown_dependency_fails_at_run() {
    let temp = Project::empty();
    temp.cmdq().args(&["new", "demo"]).passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "a", "--depends", "ghost", "--", "true"])
        .passes();
    temp.cmdq()
        .args(&["run", "demo"])
        .fails_with(1)
        .stderr_has("unknown job");
}
