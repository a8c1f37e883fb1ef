//! Terminal rendering for analysis reports.
//!
//! Renders from the structured report records only; nothing here feeds
//! back into aggregation. Stack frames are wrapped to the configured display
//! width.

use crate::parser::schema::{CpuReport, DeadlockWarning, StackSample, StateReport, ThreadStackSample};
use colored::*;

const FRAME_INDENT: &str = "        ";

/// Render the state-count report
pub fn render_state_report(report: &StateReport, width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} ({} samples)\n",
        "Thread States".bold(),
        report.total_records
    ));
    out.push_str("---------------------------------------------------\n");

    if report.rows.is_empty() {
        out.push_str("  No thread records found\n");
        return out;
    }

    for row in &report.rows {
        out.push_str(&format!(
            "  {}: {} ({:.2}%)\n",
            row.state, row.count, row.percentage
        ));
        for sample in &row.stack_samples {
            out.push_str(&render_stack_sample(sample, width));
        }
    }

    out
}

fn render_stack_sample(sample: &StackSample, width: usize) -> String {
    let mut out = format!("    {} ({:.2}%)\n", sample.count, sample.percentage);
    out.push_str(&render_frames(&sample.frames, width));
    out
}

/// Render the CPU ranking report
pub fn render_cpu_report(report: &CpuReport, width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} ({:?} merge)\n",
        "Top Threads by Average CPU".bold(),
        report.merge_policy
    ));
    out.push_str("---------------------------------------------------\n");

    if report.threads.is_empty() {
        out.push_str("  No CPU samples found\n");
        return out;
    }

    out.push_str(&format!(
        "  {:>4}  {:>10}  {:>10}  {:>8}  {:>7}  {}\n",
        "#", "TID", "NID", "AVG CPU", "SAMPLES", "NAME"
    ));

    for (rank, row) in report.threads.iter().enumerate() {
        out.push_str(&format!(
            "  {:>4}  {:>10}  {:>10}  {:>7.2}%  {:>7}  {}\n",
            rank + 1,
            row.thread_id,
            format!("0x{}", row.thread_id_hex),
            row.average_cpu,
            row.sample_count,
            row.thread_name
        ));
        for sample in &row.stack_samples {
            out.push_str(&render_thread_stack_sample(sample, width));
        }
    }

    out
}

fn render_thread_stack_sample(sample: &ThreadStackSample, width: usize) -> String {
    let state = sample
        .state
        .map(|s| s.to_string())
        .unwrap_or_else(|| "(no state)".to_string());
    let mut out = format!(
        "    {} ({:.2}%) {}\n",
        sample.count, sample.percentage, state
    );
    if sample.frames.is_empty() {
        out.push_str(&format!("{}(no frames)\n", FRAME_INDENT));
    } else {
        out.push_str(&render_frames(&sample.frames, width));
    }
    out
}

/// One frame per line, each wrapped to `width` columns
///
/// Widths no wider than the indent still wrap, one character per line.
fn render_frames(frames: &[String], width: usize) -> String {
    let usable = width.saturating_sub(FRAME_INDENT.len()).max(1);
    frames
        .iter()
        .flat_map(|frame| wrap_text(frame, usable))
        .map(|line| format!("{}{}\n", FRAME_INDENT, line.dimmed()))
        .collect()
}

/// Render the single-line deadlock warning
pub fn render_deadlock_warning(warning: &DeadlockWarning) -> String {
    format!(
        "{} deadlock reported in {} dump file(s), last in {}",
        "WARNING:".red().bold(),
        warning.affected_files,
        warning.last_file
    )
}

/// Split `text` into chunks of at most `width` characters
///
/// A width of 0 disables wrapping.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
