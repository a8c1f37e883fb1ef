//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the snapshot format
//! 2. Discovers dump and usage snapshots
//! 3. Counts thread states, or ranks threads by CPU
//! 4. Writes the optional JSON report and flamegraph
//! 5. Prints the text report

use crate::aggregator::{
    build_collapsed_stacks, thread_id_hex, CollapsedStack, CpuMerger, DeadlockDetector,
    IdentityResolver, StateAggregator,
};
use crate::commands::models::AnalyzeArgs;
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::output::{
    render_cpu_report, render_deadlock_warning, render_state_report, write_report, write_svg,
};
use crate::parser::lines::source_name;
use crate::parser::schema::{AnalysisReport, CpuReport, CpuRow, DeadlockWarning, StateReport};
use crate::parser::{scan_dump_file, scan_usage_file, DumpEvent};
use crate::samples::{discover_snapshots, validate_samples_dir, SnapshotSet};
use crate::utils::config::{SnapshotFormat, SCHEMA_VERSION};
use crate::utils::error::ConfigError;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The structured report that was rendered
///
/// # Errors
/// * Invalid samples directory or format file
/// * Snapshot read failures
/// * Output write failures
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();

    let format = load_format(args.format_file.as_deref())?;
    let snapshots = discover_snapshots(&args.samples_dir, &format)
        .context("Failed to read samples directory")?;

    info!(
        "Analyzing {} dump and {} usage snapshots in {}",
        snapshots.dump_files.len(),
        snapshots.usage_files.len(),
        snapshots.dir.display()
    );

    let mut report = AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        samples_dir: snapshots.dir.display().to_string(),
        dump_files: snapshots.dump_names(),
        usage_files: snapshots.usage_names(),
        state_report: None,
        cpu_report: None,
        deadlock: None,
    };

    if args.cpu_usage {
        report.cpu_report = Some(analyze_cpu(&snapshots, &args, &format)?);
        if args.output_svg.is_some() {
            warn!("Flamegraph output is only produced for thread state analysis");
        }
    } else {
        let analysis = analyze_states(&snapshots, &args, &format)?;
        if let Some(svg_path) = &args.output_svg {
            write_flamegraph(&analysis.stacks, svg_path)?;
        }
        report.state_report = Some(analysis.report);
        report.deadlock = analysis.deadlock;
    }

    if let Some(json_path) = &args.output_json {
        write_report(&report, json_path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", json_path.display());
    }

    if args.print_report {
        print_report(&report, args.width);
    }

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Load the snapshot format, falling back to the defaults
fn load_format(path: Option<&Path>) -> Result<SnapshotFormat> {
    match path {
        Some(path) => {
            info!("Loading snapshot format from: {}", path.display());
            SnapshotFormat::load(path)
                .with_context(|| format!("Failed to load snapshot format {}", path.display()))
        }
        None => Ok(SnapshotFormat::default()),
    }
}

/// Result of the thread state analysis
#[derive(Debug, Clone)]
pub struct StateAnalysis {
    pub report: StateReport,
    pub deadlock: Option<DeadlockWarning>,

    /// Collapsed stacks, populated when stacks or a flamegraph were requested
    pub stacks: Vec<CollapsedStack>,
}

/// Count thread states across every dump snapshot
///
/// **Public** - state-count mode of the analyze command
///
/// # Errors
/// * A dump snapshot cannot be read
pub fn analyze_states(
    snapshots: &SnapshotSet,
    args: &AnalyzeArgs,
    format: &SnapshotFormat,
) -> Result<StateAnalysis> {
    let track_signatures = args.show_stack_traces || args.output_svg.is_some();
    let mut aggregator = StateAggregator::new(track_signatures);
    let mut deadlocks = DeadlockDetector::new();

    info!("Parsing thread dumps...");
    let total = snapshots.dump_files.len();
    for (i, path) in snapshots.dump_files.iter().enumerate() {
        let stats = scan_dump_file(path, format, args.stack_trace_lines, |event| match event {
            DumpEvent::Record(record) => aggregator.fold(record),
            DumpEvent::Deadlock(event) => deadlocks.record(event),
        })
        .with_context(|| format!("Failed to parse thread dump {}", path.display()))?;

        debug!(
            "[{}/{}] {}: {} thread records",
            i + 1,
            total,
            source_name(path),
            stats.records
        );
    }

    let report = aggregator.report(args.stack_samples());
    info!(
        "Counted {} thread records in {} states",
        report.total_records,
        report.rows.len()
    );

    let deadlock = deadlocks.warning();
    let stacks = if track_signatures {
        build_collapsed_stacks(&aggregator)
    } else {
        Vec::new()
    };

    Ok(StateAnalysis {
        report,
        deadlock,
        stacks,
    })
}

/// Rank threads by merged CPU usage and resolve their names and stacks
///
/// **Public** - CPU-ranking mode of the analyze command
///
/// # Errors
/// * A usage or dump snapshot cannot be read
pub fn analyze_cpu(
    snapshots: &SnapshotSet,
    args: &AnalyzeArgs,
    format: &SnapshotFormat,
) -> Result<CpuReport> {
    let mut merger = CpuMerger::new(args.merge_policy);

    info!("Reading CPU usage snapshots...");
    let total = snapshots.usage_files.len();
    for (i, path) in snapshots.usage_files.iter().enumerate() {
        let stats = scan_usage_file(path, args.number_of_threads, |sample| merger.add(&sample))
            .with_context(|| format!("Failed to read usage snapshot {}", path.display()))?;

        debug!(
            "[{}/{}] {}: {} samples",
            i + 1,
            total,
            source_name(path),
            stats.accepted
        );
    }

    let ranked = merger.rank(args.number_of_threads);
    info!(
        "Ranked {} of {} threads, resolving identities...",
        ranked.len(),
        merger.len()
    );

    let thread_ids: Vec<u64> = ranked.iter().map(|r| r.thread_id).collect();
    let mut resolver = IdentityResolver::new(
        format,
        &thread_ids,
        args.stack_trace_lines,
        args.show_stack_traces,
    );

    if !ranked.is_empty() {
        for path in &snapshots.dump_files {
            if resolver.is_complete() {
                debug!("All thread names resolved, skipping remaining dumps");
                break;
            }
            resolver
                .scan_file(path)
                .with_context(|| format!("Failed to read thread dump {}", path.display()))?;
        }
    }

    let threads = ranked
        .iter()
        .map(|record| {
            let thread_name = resolver.name(record.thread_id).to_string();
            if thread_name.is_empty() {
                debug!("No dump names thread {}", record.thread_id);
            }
            CpuRow {
                thread_id: record.thread_id,
                thread_id_hex: thread_id_hex(record.thread_id),
                thread_name,
                average_cpu: record.running_average,
                sample_count: record.sample_count,
                stack_samples: match args.stack_samples() {
                    Some(k) => resolver.stack_samples(record.thread_id, k),
                    None => Vec::new(),
                },
            }
        })
        .collect();

    Ok(CpuReport {
        merge_policy: merger.policy(),
        threads,
    })
}

/// Render collapsed stacks and write them as an SVG flamegraph
fn write_flamegraph(stacks: &[CollapsedStack], svg_path: &Path) -> Result<()> {
    if stacks.is_empty() {
        warn!("No thread records found, skipping flamegraph");
        return Ok(());
    }

    info!("Generating flamegraph...");
    let config = FlamegraphConfig::new();
    let svg = generate_flamegraph(stacks, Some(&config)).context("Failed to generate flamegraph")?;
    write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
    info!("✓ Flamegraph written to: {}", svg_path.display());
    Ok(())
}

/// Print the text report to stdout
///
/// **Private** - internal helper for execute_analyze
fn print_report(report: &AnalysisReport, width: usize) {
    if let Some(state_report) = &report.state_report {
        println!("{}", render_state_report(state_report, width));
    }
    if let Some(cpu_report) = &report.cpu_report {
        println!("{}", render_cpu_report(cpu_report, width));
    }
    if let Some(deadlock) = &report.deadlock {
        println!("{}", render_deadlock_warning(deadlock));
    }
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
///
/// # Errors
/// * `ConfigError::SamplesDirMissing` / `ConfigError::NotADirectory`
/// * `ConfigError::InvalidArgument` - A count or width is zero
pub fn validate_args(args: &AnalyzeArgs) -> Result<(), ConfigError> {
    validate_samples_dir(&args.samples_dir)?;

    if args.show_stack_traces && args.stack_trace_samples == 0 {
        return Err(ConfigError::InvalidArgument(
            "stack trace samples must be greater than 0".to_string(),
        ));
    }

    if args.stack_trace_lines == 0 {
        return Err(ConfigError::InvalidArgument(
            "stack trace lines must be greater than 0".to_string(),
        ));
    }

    if args.number_of_threads == 0 {
        return Err(ConfigError::InvalidArgument(
            "number of threads must be greater than 0".to_string(),
        ));
    }

    if args.width == 0 {
        return Err(ConfigError::InvalidArgument(
            "width must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
