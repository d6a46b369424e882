// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use chrono::{DateTime, TimeZone, Utc};

/// A clock that provides the current wall-clock time.
///
/// Session identifiers embed a UTC timestamp; routing time through this
/// trait keeps them deterministic in tests.
pub trait Clock: Clone + Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    fn epoch_ms(&self) -> u64 {
        self.now_utc().timestamp_millis().max(0) as u64
    }
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests
#[derive(Clone)]
pub struct FakeClock(DateTime<Utc>);

impl FakeClock {
    /// A clock pinned to an arbitrary but stable instant.
    pub fn new() -> Self {
        Self::at_epoch_secs(1_700_000_000)
    }

    pub fn at(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn at_epoch_secs(secs: i64) -> Self {
        Self(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
