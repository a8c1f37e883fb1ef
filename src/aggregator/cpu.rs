//! Per-thread CPU merging and ranking.
//!
//! The default merge is a pairwise recurrence, not an arithmetic mean:
//! the first sample is taken as-is and every later sample `s` updates the
//! stored value to `(avg + s) / 2`. Later samples therefore weigh more than
//! earlier ones. `MergePolicy::Mean` gives a true mean when asked for.

use crate::parser::CpuSample;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How successive samples of one thread are combined
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// `avg := (avg + s) / 2`
    #[default]
    Recency,

    /// Arithmetic mean of every sample
    Mean,
}

/// Merged CPU figures for one thread
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadCpuRecord {
    pub thread_id: u64,
    pub running_average: f64,
    pub sample_count: u64,
    sample_sum: f64,
}

impl ThreadCpuRecord {
    fn new(sample: &CpuSample) -> Self {
        Self {
            thread_id: sample.thread_id,
            running_average: sample.cpu_percent,
            sample_count: 1,
            sample_sum: sample.cpu_percent,
        }
    }

    fn merge(&mut self, cpu_percent: f64, policy: MergePolicy) {
        self.sample_count += 1;
        self.sample_sum += cpu_percent;
        self.running_average = match policy {
            MergePolicy::Recency => (self.running_average + cpu_percent) / 2.0,
            MergePolicy::Mean => self.sample_sum / self.sample_count as f64,
        };
    }
}

/// Accumulates samples from every usage file of a run
#[derive(Debug, Clone, Default)]
pub struct CpuMerger {
    policy: MergePolicy,
    index: HashMap<u64, usize>,
    records: Vec<ThreadCpuRecord>,
}

impl CpuMerger {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Merge one sample into its thread's record
    pub fn add(&mut self, sample: &CpuSample) {
        match self.index.get(&sample.thread_id) {
            Some(&slot) => self.records[slot].merge(sample.cpu_percent, self.policy),
            None => {
                self.index.insert(sample.thread_id, self.records.len());
                self.records.push(ThreadCpuRecord::new(sample));
            }
        }
    }

    pub fn get(&self, thread_id: u64) -> Option<&ThreadCpuRecord> {
        self.index.get(&thread_id).map(|&slot| &self.records[slot])
    }

    /// Distinct threads seen so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `top_n` threads with the highest merged average, descending
    ///
    /// Equal averages keep first-seen order.
    pub fn rank(&self, top_n: usize) -> Vec<ThreadCpuRecord> {
        let mut ranked = self.records.clone();
        ranked.sort_by(|a, b| b.running_average.total_cmp(&a.running_average));
        ranked.truncate(top_n);
        debug!(
            "Ranked {} of {} threads by average CPU",
            ranked.len(),
            self.records.len()
        );
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(thread_id: u64, cpu_percent: f64) -> CpuSample {
        CpuSample {
            thread_id,
            cpu_percent,
            source_file: "top.1".to_string(),
        }
    }

    #[test]
    fn test_recency_recurrence_is_not_a_mean() {
        let mut merger = CpuMerger::new(MergePolicy::Recency);
        for s in [10.0, 20.0, 60.0] {
            merger.add(&sample(7, s));
        }

        let record = merger.get(7).unwrap();
        assert_eq!(record.running_average, ((10.0 + 20.0) / 2.0 + 60.0) / 2.0);
        assert_eq!(record.running_average, 37.5);
        assert_eq!(record.sample_count, 3);
    }

    #[test]
    fn test_mean_policy() {
        let mut merger = CpuMerger::new(MergePolicy::Mean);
        for s in [10.0, 20.0, 60.0] {
            merger.add(&sample(7, s));
        }
        assert_eq!(merger.get(7).unwrap().running_average, 30.0);
    }

    #[test]
    fn test_rank_descending_and_capped() {
        let mut merger = CpuMerger::default();
        merger.add(&sample(1, 5.0));
        merger.add(&sample(2, 50.0));
        merger.add(&sample(3, 20.0));
        merger.add(&sample(1, 95.0));

        let ranked: Vec<u64> = merger.rank(2).iter().map(|r| r.thread_id).collect();
        assert_eq!(ranked, vec![1, 2]);
        assert_eq!(merger.len(), 3);
    }

    #[test]
    fn test_rank_ties_keep_first_seen_order() {
        let mut merger = CpuMerger::default();
        merger.add(&sample(9, 10.0));
        merger.add(&sample(4, 10.0));
        merger.add(&sample(6, 10.0));

        let ranked: Vec<u64> = merger.rank(10).iter().map(|r| r.thread_id).collect();
        assert_eq!(ranked, vec![9, 4, 6]);
    }
}
