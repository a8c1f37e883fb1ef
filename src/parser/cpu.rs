//! CPU-usage snapshot reader.
//!
//! A usage snapshot is a per-thread listing (e.g. `top -H -b -n 1` output
//! trimmed to its rows) where each row has at least six whitespace separated
//! fields: field 0 is the CPU percentage and field 5 the decimal thread id.
//!
//! Precondition: rows are sorted by CPU percentage, descending. Reading a
//! file stops at the first `0.0` row, so an unsorted file silently loses
//! every row after its first idle thread.

use super::lines::{for_each_line, source_name};
use crate::utils::error::ParseError;
use log::debug;
use std::ops::ControlFlow;
use std::path::Path;

const CPU_FIELD: usize = 0;
const THREAD_ID_FIELD: usize = 5;
const MIN_FIELDS: usize = 6;

/// One row of a usage snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSample {
    pub thread_id: u64,
    pub cpu_percent: f64,
    pub source_file: String,
}

/// Parse one usage row; `None` for headers and malformed rows
pub fn parse_usage_row(line: &str, source_file: &str) -> Option<CpuSample> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let cpu_percent: f64 = fields[CPU_FIELD].parse().ok()?;
    if !cpu_percent.is_finite() {
        return None;
    }
    let thread_id: u64 = fields[THREAD_ID_FIELD].parse().ok()?;

    Some(CpuSample {
        thread_id,
        cpu_percent,
        source_file: source_file.to_string(),
    })
}

/// Counts reported after a usage file has been read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageFileStats {
    pub accepted: usize,
    pub malformed: usize,
    pub reached_zero: bool,
}

/// Applies the per-file cut-offs: first zero row, and `max_rows` samples
#[derive(Debug)]
pub struct UsageReader {
    max_rows: usize,
    source_file: String,
    stats: UsageFileStats,
}

impl UsageReader {
    pub fn new(max_rows: usize, source_file: impl Into<String>) -> Self {
        Self {
            max_rows,
            source_file: source_file.into(),
            stats: UsageFileStats::default(),
        }
    }

    /// True once no further row of this file may be read
    pub fn done(&self) -> bool {
        self.stats.reached_zero || self.stats.accepted >= self.max_rows
    }

    pub fn feed(&mut self, line: &str) -> Option<CpuSample> {
        if self.done() {
            return None;
        }

        let Some(sample) = parse_usage_row(line, &self.source_file) else {
            if !line.trim().is_empty() {
                self.stats.malformed += 1;
            }
            return None;
        };

        if sample.cpu_percent == 0.0 {
            self.stats.reached_zero = true;
            return None;
        }

        self.stats.accepted += 1;
        Some(sample)
    }

    pub fn stats(&self) -> UsageFileStats {
        self.stats
    }
}

/// Read one usage file, handing each accepted sample to `sink`
///
/// **Public** - main entry point for usage parsing
///
/// # Errors
/// * `ParseError::ReadFailed` - The file cannot be read
pub fn scan_usage_file<F>(
    path: &Path,
    max_rows: usize,
    mut sink: F,
) -> Result<UsageFileStats, ParseError>
where
    F: FnMut(CpuSample),
{
    let mut reader = UsageReader::new(max_rows, source_name(path));

    for_each_line(path, |line| {
        if let Some(sample) = reader.feed(line) {
            sink(sample);
        }
        if reader.done() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    let stats = reader.stats();
    debug!(
        "{}: {} samples, {} malformed rows skipped{}",
        path.display(),
        stats.accepted,
        stats.malformed,
        if stats.reached_zero { ", stopped at idle row" } else { "" }
    );
    Ok(stats)
}

/// Read a usage snapshot held in memory
pub fn parse_usage(text: &str, max_rows: usize, source_file: &str) -> Vec<CpuSample> {
    let mut reader = UsageReader::new(max_rows, source_file);
    let mut samples = Vec::new();
    for line in text.lines() {
        if let Some(sample) = reader.feed(line) {
            samples.push(sample);
        }
        if reader.done() {
            break;
        }
    }
    samples
}
