//! Per-state aggregation of thread records.
//!
//! Every record adds one to its state's count. When signature tracking is
//! on, the record's stack signature is also counted so the most common
//! stacks per state can be reported.

use super::frequency::{percentage, Histogram};
use crate::parser::schema::{StackSample, StateReport, StateRow};
use crate::parser::dump::join_frames;
use crate::parser::{ThreadRecord, ThreadState};
use log::debug;

/// Running totals for one thread state
#[derive(Debug, Clone)]
pub struct StateAggregate {
    pub state: ThreadState,
    pub total_count: u64,
    /// Counts keyed by the record's frames, innermost first
    pub signatures: Histogram<Vec<String>>,
}

impl StateAggregate {
    fn new(state: ThreadState) -> Self {
        Self {
            state,
            total_count: 0,
            signatures: Histogram::new(),
        }
    }
}

/// Folds thread records from every dump of a run
#[derive(Debug, Clone)]
pub struct StateAggregator {
    aggregates: [StateAggregate; 6],
    track_signatures: bool,
}

impl StateAggregator {
    pub fn new(track_signatures: bool) -> Self {
        Self {
            aggregates: ThreadState::ALL.map(StateAggregate::new),
            track_signatures,
        }
    }

    /// Add one record to its state's aggregate
    pub fn fold(&mut self, record: ThreadRecord) {
        let aggregate = &mut self.aggregates[record.state.index()];
        aggregate.total_count += 1;
        if self.track_signatures {
            aggregate.signatures.add(record.frames);
        }
    }

    pub fn aggregate(&self, state: ThreadState) -> &StateAggregate {
        &self.aggregates[state.index()]
    }

    /// Aggregates in report order, including empty ones
    pub fn aggregates(&self) -> impl Iterator<Item = &StateAggregate> {
        self.aggregates.iter()
    }

    /// Records folded so far, across all states
    pub fn total_records(&self) -> u64 {
        self.aggregates.iter().map(|a| a.total_count).sum()
    }

    /// Build the state-count report
    ///
    /// States with no records are left out. `stack_samples` selects how many
    /// top stacks to list per state; `None` omits them.
    pub fn report(&self, stack_samples: Option<usize>) -> StateReport {
        let grand_total = self.total_records();
        debug!("Building state report over {} records", grand_total);

        let rows = self
            .aggregates
            .iter()
            .filter(|a| a.total_count > 0)
            .map(|a| StateRow {
                state: a.state,
                count: a.total_count,
                percentage: percentage(a.total_count, grand_total),
                stack_samples: match stack_samples {
                    Some(k) if self.track_signatures => top_stacks(a, k),
                    _ => Vec::new(),
                },
            })
            .collect();

        StateReport {
            total_records: grand_total,
            rows,
        }
    }
}

fn top_stacks(aggregate: &StateAggregate, k: usize) -> Vec<StackSample> {
    aggregate
        .signatures
        .top_k(k)
        .into_iter()
        .map(|(frames, count)| StackSample {
            count,
            percentage: percentage(count, aggregate.total_count),
            stack: join_frames(frames),
            frames: frames.clone(),
        })
        .collect()
}
