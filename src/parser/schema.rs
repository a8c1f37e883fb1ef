//! Output schema definitions for analysis reports.
//!
//! These are the structured records every reporter renders from, whether
//! as terminal text or as JSON on disk. Schema is versioned to allow future
//! evolution.

use super::thread_state::ThreadState;
use crate::aggregator::cpu::MergePolicy;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// Snapshot directory that was analyzed
    pub samples_dir: String,

    /// Dump snapshots, in processing order
    pub dump_files: Vec<String>,

    /// Usage snapshots, in processing order
    pub usage_files: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_report: Option<StateReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_report: Option<CpuReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadlock: Option<DeadlockWarning>,
}

/// Sample counts per thread state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    /// Thread records parsed across all dumps
    pub total_records: u64,

    /// One row per observed state, in fixed state order
    pub rows: Vec<StateRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRow {
    pub state: ThreadState,
    pub count: u64,

    /// Share of all records
    pub percentage: f64,

    /// Most frequent stacks in this state (empty unless requested)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_samples: Vec<StackSample>,
}

/// A stack signature and how often it was seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSample {
    pub count: u64,

    /// Share of the owning group's records
    pub percentage: f64,

    /// Frames joined with `;`, innermost first
    pub stack: String,

    /// The frames themselves, innermost first
    #[serde(default)]
    pub frames: Vec<String>,
}

/// Top CPU consuming threads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuReport {
    pub merge_policy: MergePolicy,
    pub threads: Vec<CpuRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuRow {
    pub thread_id: u64,

    /// Lowercase hex form used by dump headers
    pub thread_id_hex: String,

    /// Empty when no dump names this thread
    pub thread_name: String,

    pub average_cpu: f64,
    pub sample_count: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_samples: Vec<ThreadStackSample>,
}

/// A state and stack observed for one thread, and how often
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadStackSample {
    pub count: u64,

    /// Share of this thread's dump occurrences
    pub percentage: f64,

    /// `None` for threads whose dump entry carries no state line
    pub state: Option<ThreadState>,

    pub stack: String,

    #[serde(default)]
    pub frames: Vec<String>,
}

/// Dumps that reported a deadlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockWarning {
    pub affected_files: usize,

    /// Last affected file in processing order
    pub last_file: String,

    /// Every affected file, in processing order
    #[serde(default)]
    pub files: Vec<String>,
}
