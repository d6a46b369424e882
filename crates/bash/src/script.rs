// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-script assembly: shebang, env exports, directory setup, sections.

use crate::quote::{sh_quote, sh_quote_path};
use std::path::PathBuf;

const DEFAULT_SHEBANG: &str = "#!/bin/bash";

/// Assembles one generated script from ordered pieces.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    shebang: String,
    comments: Vec<String>,
    env: Vec<(String, String)>,
    mkdirs: Vec<PathBuf>,
    header_commands: Vec<String>,
    sections: Vec<String>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            shebang: DEFAULT_SHEBANG.to_string(),
            comments: Vec::new(),
            env: Vec::new(),
            mkdirs: Vec::new(),
            header_commands: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn shebang(mut self, v: impl Into<String>) -> Self {
        self.shebang = v.into();
        self
    }

    /// Add a `# ...` line under the shebang.
    pub fn comment(mut self, v: impl Into<String>) -> Self {
        self.comments.push(v.into());
        self
    }

    pub fn export(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn exports<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn mkdir(mut self, dpath: impl Into<PathBuf>) -> Self {
        self.mkdirs.push(dpath.into());
        self
    }

    /// One-time setup command emitted before any job (e.g. venv activation).
    pub fn header_command(mut self, v: impl Into<String>) -> Self {
        self.header_commands.push(v.into());
        self
    }

    pub fn section(mut self, text: impl Into<String>) -> Self {
        self.sections.push(text.into());
        self
    }

    pub fn build(self) -> String {
        let mut out = String::new();
        out.push_str(&self.shebang);
        out.push('\n');
        for comment in &self.comments {
            out.push_str("# ");
            out.push_str(comment);
            out.push('\n');
        }
        for (key, value) in &self.env {
            out.push_str(&format!("export {}={}\n", key, sh_quote(value)));
        }
        for dpath in &self.mkdirs {
            out.push_str(&format!("mkdir -p {}\n", sh_quote_path(dpath)));
        }
        for command in &self.header_commands {
            out.push_str(command);
            out.push('\n');
        }
        for section in &self.sections {
            out.push('\n');
            out.push_str(section);
            out.push('\n');
        }
        out
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
