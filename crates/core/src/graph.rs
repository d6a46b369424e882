// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory DAG of jobs: submission, naming, ordering.
//!
//! The model is insertion-ordered; topological ordering breaks ties by
//! submission index so output is deterministic for a given submission
//! sequence.

use crate::error::QueueError;
use crate::job::{Job, JobSpec};
use indexmap::IndexMap;
use std::collections::BinaryHeap;

/// The backend-agnostic job graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphModel {
    name: String,
    jobs: IndexMap<String, Job>,
    counter: usize,
}

impl GraphModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: IndexMap::new(),
            counter: 0,
        }
    }

    /// Rebuild a model from previously stored jobs (queue-store loading).
    ///
    /// Duplicate names in the input are rejected the same way `submit`
    /// rejects them.
    pub fn from_jobs(
        name: impl Into<String>,
        jobs: impl IntoIterator<Item = JobSpec>,
    ) -> Result<Self, QueueError> {
        let mut model = Self::new(name);
        for spec in jobs {
            model.submit(spec)?;
        }
        Ok(model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a job to the graph.
    ///
    /// Dependencies may name jobs that have not been submitted yet; they
    /// must resolve by the time the graph is ordered. Returns the stored
    /// job so callers can read back the assigned name.
    pub fn submit(&mut self, spec: JobSpec) -> Result<&Job, QueueError> {
        let name = match &spec.name {
            Some(name) => name.clone(),
            None => format!("{}-job-{}", self.name, self.counter),
        };
        if self.jobs.contains_key(&name) {
            return Err(QueueError::DuplicateJob { name });
        }
        let job = Job::from_spec(spec, name.clone(), self.jobs.len());
        self.counter += 1;
        Ok(self.jobs.entry(name).or_insert(job))
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    /// Jobs in submission order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// All dependency edges as `(dependency, dependent)` name pairs.
    pub fn all_depends(&self) -> Vec<(&str, &str)> {
        self.jobs
            .values()
            .flat_map(|job| {
                job.depends
                    .iter()
                    .map(move |dep| (dep.as_str(), job.name.as_str()))
            })
            .collect()
    }

    /// Verify that every dependency names a submitted job.
    pub fn resolve(&self) -> Result<(), QueueError> {
        for job in self.jobs.values() {
            for dep in &job.depends {
                if !self.jobs.contains_key(dep) {
                    return Err(QueueError::UnknownDependency {
                        job: job.name.clone(),
                        depend: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Stable topological order over all jobs.
    ///
    /// Kahn's algorithm; among ready jobs the smallest submission index
    /// runs first. Nodes left over after the queue drains form a cycle
    /// (self-loops included) and fail the whole ordering.
    pub fn order_jobs(&self) -> Result<Vec<&Job>, QueueError> {
        self.resolve()?;

        let mut in_degree: IndexMap<&str, usize> =
            self.jobs.keys().map(|name| (name.as_str(), 0)).collect();
        let mut dependents: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for job in self.jobs.values() {
            for dep in &job.depends {
                *in_degree.entry(job.name.as_str()).or_insert(0) += 1;
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(job.name.as_str());
            }
        }

        // Min-heap on submission index via Reverse.
        let mut ready: BinaryHeap<std::cmp::Reverse<usize>> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .filter_map(|(name, _)| self.jobs.get(*name).map(|j| std::cmp::Reverse(j.index)))
            .collect();

        let mut ordered = Vec::with_capacity(self.jobs.len());
        while let Some(std::cmp::Reverse(index)) = ready.pop() {
            let Some((_, job)) = self.jobs.get_index(index) else {
                break;
            };
            ordered.push(job);
            for dependent in dependents.get(job.name.as_str()).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        if let Some(j) = self.jobs.get(*dependent) {
                            ready.push(std::cmp::Reverse(j.index));
                        }
                    }
                }
            }
        }

        if ordered.len() != self.jobs.len() {
            let emitted: std::collections::HashSet<&str> =
                ordered.iter().map(|j| j.name.as_str()).collect();
            let names = self
                .jobs
                .keys()
                .filter(|n| !emitted.contains(n.as_str()))
                .cloned()
                .collect();
            return Err(QueueError::CycleDetected { names });
        }
        Ok(ordered)
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
