// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for slurm driver emission. Pure text: no slurm cluster needed.

use crate::prelude::*;

#[test]
fn driver_wires_afterok_dependencies() {
    let temp = Project::empty();
    temp.cmdq()
        .args(&["new", "demo", "--backend", "slurm"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "a", "--", "echo", "A"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "b", "--depends", "a", "--", "echo", "B"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--name", "c", "--", "echo", "C"])
        .passes();
    temp.cmdq()
        .args(&[
            "submit", "demo", "--name", "d", "--depends", "b", "--depends", "c", "--", "echo",
            "D",
        ])
        .passes();

    let stdout = temp
        .cmdq()
        .args(&["show", "demo", "--commands"])
        .passes()
        .stdout();

    assert!(stdout.contains("JOB_000=$(sbatch"));
    assert!(stdout.contains("--dependency=afterok:${JOB_000}"));
    assert!(stdout.contains("--dependency=afterok:${JOB_001}:${JOB_002}"));

    // Every variable is defined before any reference to it.
    for var in ["JOB_000", "JOB_001", "JOB_002", "JOB_003"] {
        let definition = stdout
            .find(&format!("{}=$(sbatch", var))
            .unwrap_or_else(|| panic!("{} never defined", var));
        if let Some(reference) = stdout.find(&format!("${{{}}}", var)) {
            assert!(definition < reference, "{} referenced before defined", var);
        }
    }
}

#[test]
fn resource_hints_become_sbatch_flags() {
    let temp = Project::empty();
    temp.cmdq()
        .args(&["new", "demo", "--backend", "slurm"])
        .passes();
    temp.cmdq()
        .args(&[
            "submit",
            "demo",
            "--name",
            "train",
            "--cpus",
            "8",
            "--mem",
            "8GB",
            "--partition",
            "gpu",
            "--",
            "python",
            "train.py",
        ])
        .passes();

    temp.cmdq()
        .args(&["show", "demo", "--commands"])
        .passes()
        .stdout_has("--job-name=\"train\"")
        .stdout_has("--cpus-per-task=8")
        .stdout_has("--mem=8192")
        .stdout_has("--partition=gpu")
        .stdout_has("--parsable");
}

#[test]
fn bad_mem_hint_is_rejected_at_submit() {
    let temp = Project::empty();
    temp.cmdq()
        .args(&["new", "demo", "--backend", "slurm"])
        .passes();
    temp.cmdq()
        .args(&["submit", "demo", "--mem", "lots", "--", "true"])
        .fails_with(2);
}
