//! Snapshot parsing and schema definitions.
//!
//! This module handles:
//! - Reading snapshot files line by line
//! - Parsing thread dumps into thread records
//! - Reading per-thread CPU usage rows
//! - Defining the report schema

pub mod cpu;
pub mod dump;
pub mod lines;
pub mod schema;
pub mod thread_state;

// Re-export main types
pub use cpu::{parse_usage, parse_usage_row, scan_usage_file, CpuSample, UsageFileStats};
pub use dump::{
    parse_dump, scan_dump_file, DeadlockEvent, DumpEvent, DumpFileStats, DumpParser, ThreadRecord,
};
pub use schema::{
    AnalysisReport, CpuReport, CpuRow, DeadlockWarning, StackSample, StateReport, StateRow,
    ThreadStackSample,
};
pub use thread_state::ThreadState;
