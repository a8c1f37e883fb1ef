//! Aggregation of parsed snapshots into reports.
//!
//! This module transforms thread records and CPU samples into:
//! - Per-state sample counts and top stacks
//! - Per-thread merged CPU averages and rankings
//! - Thread names and stacks correlated by thread id
//! - Deadlock warnings
//! - Collapsed stacks for flamegraph generation

pub mod cpu;
pub mod deadlock;
pub mod frequency;
pub mod identity;
pub mod stack_builder;
pub mod states;

// Re-export main types and functions
pub use cpu::{CpuMerger, MergePolicy, ThreadCpuRecord};
pub use deadlock::DeadlockDetector;
pub use frequency::{percentage, Histogram};
pub use identity::{parse_identity_line, thread_id_hex, IdentityResolver};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use states::{StateAggregate, StateAggregator};
