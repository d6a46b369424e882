// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job bash block emission.
//!
//! Each block: banner, optional dependency guard, status bookkeeping,
//! the verbatim user command, pass/fail recording. Status probes use file
//! existence only (`[ -e ... ]`), never file contents, so readers racing a
//! half-written stat file cannot be confused.

use crate::quote::sh_quote_path;
use cmdq_core::{Job, JobPaths};
use std::path::PathBuf;

/// How a block probes one declared dependency.
#[derive(Debug, Clone)]
pub struct DependProbe {
    pub paths: JobPaths,
    /// Poll with `sleep 1` until the dependency is terminal before the
    /// guard decides. Needed when the dependency runs on another worker.
    pub wait: bool,
}

impl DependProbe {
    pub fn local(paths: JobPaths) -> Self {
        Self { paths, wait: false }
    }

    pub fn waiting(paths: JobPaths) -> Self {
        Self { paths, wait: true }
    }
}

/// Emission knobs shared by the serial and tmux backends.
#[derive(Debug, Clone)]
pub struct BlockOptions {
    /// Emit the skip-on-ancestor-failure guard.
    pub with_guards: bool,
    /// Serialize the command under `flock` on the session lockfile.
    pub with_locks: bool,
    /// Spaces prefixed to every line, for blocks nested in an enclosing
    /// `if`. Blocks emit no heredocs, so indentation is always safe.
    pub indent: usize,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            with_guards: true,
            with_locks: false,
            indent: 0,
        }
    }
}

/// One job rendered as a bash block.
///
/// The block never `exit`s on failure: it records the outcome in the job's
/// status files and falls through, so later guards decide for themselves.
#[derive(Debug, Clone)]
pub struct JobBlock<'a> {
    pub job: &'a Job,
    /// 1-based position in the emitted script, for the banner only.
    pub index: usize,
    pub total: usize,
    pub paths: JobPaths,
    pub depends: Vec<DependProbe>,
    /// Extra caller-supplied predicates; the job is skipped unless all
    /// hold. Used for sub-queue gating.
    pub conditionals: Vec<String>,
    pub lock_fpath: Option<PathBuf>,
    pub options: BlockOptions,
}

impl<'a> JobBlock<'a> {
    pub fn new(job: &'a Job, index: usize, total: usize, paths: JobPaths) -> Self {
        Self {
            job,
            index,
            total,
            paths,
            depends: Vec::new(),
            conditionals: Vec::new(),
            lock_fpath: None,
            options: BlockOptions::default(),
        }
    }

    pub fn render(&self) -> String {
        let mut w = Writer::new(self.options.indent);

        w.line(0, "#");
        w.line(
            0,
            format!(
                "### Command {}/{} - {}",
                self.index, self.total, self.job.name
            ),
        );
        if !self.job.hints.is_empty() {
            w.line(0, format!("# {}", self.job.hints.summary()));
        }

        if self.options.with_guards {
            for probe in self.depends.iter().filter(|p| p.wait) {
                w.line(
                    0,
                    format!(
                        "while [ ! -e {} ] && [ ! -e {} ]; do",
                        sh_quote_path(&probe.paths.pass_fpath),
                        sh_quote_path(&probe.paths.fail_fpath),
                    ),
                );
                w.line(1, "sleep 1");
                w.line(0, "done");
            }
        }

        match self.run_condition() {
            Some(cond) => {
                w.line(0, format!("if {}; then", cond));
                self.render_run(&mut w, 1);
                w.line(0, "else");
                w.line(
                    1,
                    format!(
                        "printf 'skipped %s\\n' \"$(date +%s)\" > {}",
                        sh_quote_path(&self.paths.stat_fpath)
                    ),
                );
                w.line(0, "fi");
            }
            None => self.render_run(&mut w, 0),
        }

        w.finish()
    }

    /// The predicate under which the job actually runs, or `None` when
    /// nothing guards it.
    fn run_condition(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.options.with_guards {
            for probe in &self.depends {
                parts.push(format!(
                    "[ ! -e {} ] && [ -e {} ]",
                    sh_quote_path(&probe.paths.fail_fpath),
                    sh_quote_path(&probe.paths.pass_fpath),
                ));
            }
        }
        parts.extend(self.conditionals.iter().cloned());
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" && "))
        }
    }

    fn render_run(&self, w: &mut Writer, level: usize) {
        let stat = sh_quote_path(&self.paths.stat_fpath);
        w.line(
            level,
            format!("printf 'started %s\\n' \"$(date +%s)\" > {}", stat),
        );

        if self.job.log {
            w.line(level, "(");
            self.render_command(w, level + 1);
            w.line(
                level,
                format!(
                    ") 2>&1 | tee {}",
                    sh_quote_path(&self.paths.log_fpath)
                ),
            );
            w.line(level, "CMDQ_RET=${PIPESTATUS[0]}");
        } else {
            self.render_command(w, level);
            w.line(level, "CMDQ_RET=$?");
        }

        w.line(level, "if [ \"$CMDQ_RET\" -eq 0 ]; then");
        w.line(
            level + 1,
            format!("touch {}", sh_quote_path(&self.paths.pass_fpath)),
        );
        w.line(
            level + 1,
            format!(
                "printf 'passed %s %s\\n' \"$(date +%s)\" \"$CMDQ_RET\" > {}",
                stat
            ),
        );
        w.line(level, "else");
        w.line(
            level + 1,
            format!("touch {}", sh_quote_path(&self.paths.fail_fpath)),
        );
        w.line(
            level + 1,
            format!(
                "printf 'failed %s %s\\n' \"$(date +%s)\" \"$CMDQ_RET\" > {}",
                stat
            ),
        );
        w.line(level, "fi");
    }

    fn render_command(&self, w: &mut Writer, level: usize) {
        match (&self.lock_fpath, self.options.with_locks) {
            (Some(lock), true) => {
                w.line(level, "(");
                w.line(level + 1, "flock 9");
                w.line(level + 1, &self.job.command);
                w.line(level, format!(") 9>{}", sh_quote_path(lock)));
            }
            _ => w.line(level, &self.job.command),
        }
    }
}

/// Accumulates indented lines; multi-line input is indented per line.
struct Writer {
    prefix: String,
    lines: Vec<String>,
}

impl Writer {
    fn new(indent: usize) -> Self {
        Self {
            prefix: " ".repeat(indent),
            lines: Vec::new(),
        }
    }

    fn line(&mut self, level: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
            return;
        }
        for part in text.lines() {
            if part.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines
                    .push(format!("{}{}{}", self.prefix, "    ".repeat(level), part));
            }
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
