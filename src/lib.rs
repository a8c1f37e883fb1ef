//! Thread Census
//!
//! Offline analysis of a directory of periodically captured thread dumps
//! and per-thread CPU usage snapshots.
//!
//! Two analyses are offered:
//! - thread state counts with the most frequent stacks per state
//! - the threads with the highest merged CPU usage, named and with
//!   their most frequent stacks
//!
//! ```bash
//! thread-census analyze --samples-dir ./samples --stack-traces
//! thread-census analyze --samples-dir ./samples --cpu-usage --threads 20
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod samples;
pub mod utils;
