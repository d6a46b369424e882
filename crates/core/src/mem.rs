// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory-size hints, normalized to megabytes.
//!
//! Slurm's `--mem` flag wants a megabyte count; users write "8GB" or
//! "512MB". Bare numbers are taken as megabytes.

use crate::error::QueueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A memory amount stored as whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemSize {
    megabytes: u64,
}

impl MemSize {
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self { megabytes }
    }

    pub fn megabytes(&self) -> u64 {
        self.megabytes
    }
}

impl fmt::Display for MemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}MB", self.megabytes)
    }
}

impl FromStr for MemSize {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || QueueError::InvalidMem { value: s.to_string() };

        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);
        let amount: u64 = digits.parse().map_err(|_| invalid())?;

        let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "MB" | "M" => 1,
            "GB" | "G" => 1024,
            "TB" | "T" => 1024 * 1024,
            _ => return Err(invalid()),
        };
        amount
            .checked_mul(multiplier)
            .map(MemSize::from_megabytes)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
#[path = "mem_tests.rs"]
mod tests;
