//! Output writers and renderers for analysis reports.
//!
//! This module handles turning reports into something a person or a tool
//! can read:
//! - JSON reports on disk
//! - SVG flamegraphs on disk
//! - Terminal text

pub mod json;
pub mod svg;
pub mod text;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use svg::write_svg;
pub use text::{render_cpu_report, render_deadlock_warning, render_state_report, wrap_text};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create the parent directories of `path` if they are missing
fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
