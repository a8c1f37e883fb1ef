//! Build collapsed stack format from aggregated thread records.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "root;caller;callee weight"
//!
//! Example: "WAITING;java.lang.Thread.run;java.lang.Object.wait 12"
//! This means 12 sampled threads were waiting inside Object.wait called
//! from Thread.run. Dump frames are innermost first, so they are reversed
//! here and prefixed with the thread state as the root frame.

use super::states::StateAggregator;
use crate::utils::config::SIGNATURE_SEPARATOR;
use log::debug;
use serde::{Deserialize, Serialize};

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string, root first
    pub stack: String,

    /// Number of samples with this stack
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Line in the folded format understood by flamegraph tools
    pub fn to_folded_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from per-state signature histograms
///
/// **Public** - main entry point for stack building
///
/// Returns stacks sorted by weight, descending. Empty when the aggregator
/// was not tracking signatures.
pub fn build_collapsed_stacks(aggregator: &StateAggregator) -> Vec<CollapsedStack> {
    let mut stacks: Vec<CollapsedStack> = aggregator
        .aggregates()
        .flat_map(|aggregate| {
            let root = aggregate.state.as_str();
            aggregate
                .signatures
                .iter()
                .map(move |(frames, count)| CollapsedStack::new(root_first(root, frames), count))
        })
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight));
    debug!("Built {} collapsed stacks", stacks.len());

    stacks
}

/// State root, then frames outermost first
///
/// The folded format cannot escape the separator, so a separator inside a
/// frame is replaced to keep the frame whole.
fn root_first(root: &str, frames: &[String]) -> String {
    let mut parts = vec![root.to_string()];
    parts.extend(
        frames
            .iter()
            .rev()
            .map(|frame| frame.replace(SIGNATURE_SEPARATOR, FRAME_SEPARATOR_SUBSTITUTE)),
    );
    parts.join(SIGNATURE_SEPARATOR)
}

const FRAME_SEPARATOR_SUBSTITUTE: &str = ":";
