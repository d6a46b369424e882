// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture for binary-driving specs.
//!
//! Each [`Project`] gets its own temp directory used as `CMDQ_HOME`, so
//! queue files and session directories never leak between tests or into
//! the developer's real cache.

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

pub struct Project {
    temp: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            temp: tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {}", e)),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn home(&self) -> std::path::PathBuf {
        self.temp.path().join("home")
    }

    /// A `cmdq` invocation scoped to this project's home.
    pub fn cmdq(&self) -> CmdqCmd {
        let mut cmd = assert_cmd::Command::cargo_bin("cmdq")
            .unwrap_or_else(|e| panic!("cmdq binary not built: {}", e));
        cmd.env("CMDQ_HOME", self.home());
        cmd.current_dir(self.path());
        CmdqCmd { cmd }
    }
}

pub struct CmdqCmd {
    cmd: assert_cmd::Command,
}

impl CmdqCmd {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn run(mut self) -> CmdqOutput {
        let output = self
            .cmd
            .output()
            .unwrap_or_else(|e| panic!("failed to run cmdq: {}", e));
        CmdqOutput { output }
    }

    pub fn passes(self) -> CmdqOutput {
        let out = self.run();
        assert!(
            out.output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            out.output.status.code(),
            out.stdout(),
            out.stderr(),
        );
        out
    }

    pub fn fails_with(self, code: i32) -> CmdqOutput {
        let out = self.run();
        assert_eq!(
            out.output.status.code(),
            Some(code),
            "stdout: {}\nstderr: {}",
            out.stdout(),
            out.stderr(),
        );
        out
    }
}

pub struct CmdqOutput {
    output: Output,
}

impl CmdqOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout().contains(needle),
            "stdout missing {:?}:\n{}",
            needle,
            self.stdout()
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr().contains(needle),
            "stderr missing {:?}:\n{}",
            needle,
            self.stderr()
        );
        self
    }
}

/// True when a tmux binary is usable on this machine.
pub fn tmux_available() -> bool {
    std::process::Command::new("tmux")
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
