use crate::aggregator::MergePolicy;
use crate::utils::config::{
    DEFAULT_DISPLAY_WIDTH, DEFAULT_NUMBER_OF_THREADS, DEFAULT_STACK_TRACE_LINES,
    DEFAULT_STACK_TRACE_SAMPLES,
};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory holding the captured snapshots
    pub samples_dir: PathBuf,

    /// Number of most frequent stacks to show per group
    pub stack_trace_samples: usize,

    /// Number of frames kept per thread record
    pub stack_trace_lines: usize,

    /// Include stack-trace sub-reports
    pub show_stack_traces: bool,

    /// Display width for wrapped stack text
    pub width: usize,

    /// Rank threads by CPU usage instead of counting states
    pub cpu_usage: bool,

    /// Rows read per usage file, and threads ranked
    pub number_of_threads: usize,

    /// How samples of one thread are merged
    pub merge_policy: MergePolicy,

    /// TOML file overriding the snapshot format
    pub format_file: Option<PathBuf>,

    /// Path to write the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Path to write an SVG flamegraph of sampled stacks (optional)
    pub output_svg: Option<PathBuf>,

    /// Print the text report to stdout
    pub print_report: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::new(),
            stack_trace_samples: DEFAULT_STACK_TRACE_SAMPLES,
            stack_trace_lines: DEFAULT_STACK_TRACE_LINES,
            show_stack_traces: false,
            width: DEFAULT_DISPLAY_WIDTH,
            cpu_usage: false,
            number_of_threads: DEFAULT_NUMBER_OF_THREADS,
            merge_policy: MergePolicy::Recency,
            format_file: None,
            output_json: None,
            output_svg: None,
            print_report: true,
        }
    }
}

impl AnalyzeArgs {
    /// Top-K to report, or `None` when stack sub-reports are off
    pub fn stack_samples(&self) -> Option<usize> {
        self.show_stack_traces.then_some(self.stack_trace_samples)
    }
}
