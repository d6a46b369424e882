// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell quoting for generated scaffolding.
//!
//! Only the scaffolding around a job (paths, banners, env values) is ever
//! quoted; user commands are emitted verbatim.

/// Quote a string so bash reads it as one word.
///
/// Plain words pass through untouched to keep scripts readable; anything
/// else is single-quoted with embedded quotes escaped as `'\''`.
pub fn sh_quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_plain) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

/// Quote a path for inclusion in a script.
pub fn sh_quote_path(path: &std::path::Path) -> String {
    sh_quote(&path.to_string_lossy())
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | '%' | '+')
}

#[cfg(test)]
#[path = "quote_tests.rs"]
mod tests;
