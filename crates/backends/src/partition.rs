// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Greedy chain-packing of a topological order onto tmux workers.
//!
//! Walks the order once. A job prefers a worker whose tail is one of its
//! dependencies (dependency and dependent stay on the same lane, turning
//! the cross-worker wait into a no-op); otherwise it lands on the
//! currently-shortest worker. Ties break by worker index, so the plan is
//! deterministic. This does not chase the NP-hard optimum, it just keeps
//! obvious chains together.

use cmdq_core::Job;

/// Assignment of every job to exactly one worker lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPlan {
    workers: Vec<Vec<String>>,
}

impl WorkerPlan {
    /// Worker lanes in index order; each lane lists job names in run order.
    pub fn workers(&self) -> &[Vec<String>] {
        &self.workers
    }

    pub fn worker_of(&self, name: &str) -> Option<usize> {
        self.workers
            .iter()
            .position(|lane| lane.iter().any(|n| n == name))
    }

    /// True when the edge `dep -> job` spans two lanes.
    pub fn is_cross_worker(&self, dep: &str, job: &str) -> bool {
        match (self.worker_of(dep), self.worker_of(job)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// Partition `ordered` (a topological order) into at most `size` lanes.
pub fn partition(ordered: &[&Job], size: usize) -> WorkerPlan {
    let lanes = size.clamp(1, ordered.len().max(1));
    let mut workers: Vec<Vec<String>> = vec![Vec::new(); lanes];

    for job in ordered {
        let preferred: Vec<usize> = workers
            .iter()
            .enumerate()
            .filter(|(_, lane)| {
                lane.last()
                    .is_some_and(|tail| job.depends.iter().any(|d| d == tail))
            })
            .map(|(k, _)| k)
            .collect();

        let all: Vec<usize> = (0..lanes).collect();
        let candidates = if preferred.is_empty() { &all } else { &preferred };
        let target = candidates
            .iter()
            .copied()
            .min_by_key(|&k| (workers[k].len(), k))
            .unwrap_or(0);
        workers[target].push(job.name.clone());
    }

    WorkerPlan { workers }
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
