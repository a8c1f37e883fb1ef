//! Thread Census CLI
//!
//! Summarizes thread states and per-thread CPU hot spots from a directory
//! of captured thread dumps and CPU usage snapshots.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use thread_census::aggregator::MergePolicy;
use thread_census::commands::{
    display_formats, display_version, execute_analyze, validate_args, AnalyzeArgs,
};
use thread_census::utils::config::{
    SnapshotFormat, DEFAULT_DISPLAY_WIDTH, DEFAULT_NUMBER_OF_THREADS, DEFAULT_STACK_TRACE_LINES,
    DEFAULT_STACK_TRACE_SAMPLES,
};

/// Thread Census - thread state and CPU analysis for thread dump batches
#[derive(Parser, Debug)]
#[command(name = "thread-census")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a directory of snapshots
    Analyze {
        /// Directory holding the dump and usage snapshots
        #[arg(short, long, env = "THREAD_CENSUS_SAMPLES_DIR")]
        samples_dir: PathBuf,

        /// Number of most frequent stacks shown per state or thread
        #[arg(long, default_value_t = DEFAULT_STACK_TRACE_SAMPLES)]
        stack_trace_samples: usize,

        /// Number of frames kept per thread record
        #[arg(long, default_value_t = DEFAULT_STACK_TRACE_LINES)]
        stack_trace_lines: usize,

        /// Include the most frequent stacks in the report
        #[arg(long)]
        stack_traces: bool,

        /// Display width for stack frames
        #[arg(short, long, default_value_t = DEFAULT_DISPLAY_WIDTH)]
        width: usize,

        /// Rank threads by CPU usage instead of counting states
        #[arg(short, long)]
        cpu_usage: bool,

        /// Rows read per usage snapshot, and threads reported
        #[arg(short = 'n', long, default_value_t = DEFAULT_NUMBER_OF_THREADS)]
        threads: usize,

        /// How the samples of one thread are merged
        #[arg(long, value_enum, default_value_t = MergePolicy::Recency)]
        merge_policy: MergePolicy,

        /// TOML file overriding the snapshot format
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path for the JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for an SVG flamegraph of state stacks (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Do not print the text report
        #[arg(short, long)]
        quiet: bool,
    },

    /// Display the recognised snapshot format
    Formats {
        /// Show the format loaded from this TOML file instead of the default
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            samples_dir,
            stack_trace_samples,
            stack_trace_lines,
            stack_traces,
            width,
            cpu_usage,
            threads,
            merge_policy,
            config,
            output,
            flamegraph,
            quiet,
        } => {
            let args = AnalyzeArgs {
                samples_dir,
                stack_trace_samples,
                stack_trace_lines,
                show_stack_traces: stack_traces,
                width,
                cpu_usage,
                number_of_threads: threads,
                merge_policy,
                format_file: config,
                output_json: output,
                output_svg: flamegraph,
                print_report: !quiet,
            };

            // Bad arguments end with the usage message
            if let Err(e) = validate_args(&args) {
                Cli::command()
                    .error(ErrorKind::ValueValidation, e.to_string())
                    .exit();
            }

            execute_analyze(args)?;
        }

        Commands::Formats { config } => {
            let format = match config {
                Some(path) => SnapshotFormat::load(&path)?,
                None => SnapshotFormat::default(),
            };
            display_formats(&format)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
