//! Snapshot directory discovery.
//!
//! The sampling tool drops paired captures into one directory, e.g.
//! `jstack.0001`, `top.0001`, `jstack.0002`, ... Files are classified by
//! name prefix and processed in file-name order, which is the order every
//! "last file" in a report refers to.

use crate::utils::config::SnapshotFormat;
use crate::utils::error::ConfigError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// The snapshot files of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSet {
    pub dir: PathBuf,
    pub dump_files: Vec<PathBuf>,
    pub usage_files: Vec<PathBuf>,
}

impl SnapshotSet {
    /// File names of the dump snapshots
    pub fn dump_names(&self) -> Vec<String> {
        file_names(&self.dump_files)
    }

    /// File names of the usage snapshots
    pub fn usage_names(&self) -> Vec<String> {
        file_names(&self.usage_files)
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| crate::parser::lines::source_name(p))
        .collect()
}

/// Check that `dir` exists and is a directory
///
/// # Errors
/// * `ConfigError::SamplesDirMissing` - Nothing exists at `dir`
/// * `ConfigError::NotADirectory` - `dir` is a file
pub fn validate_samples_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        return Err(ConfigError::SamplesDirMissing(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ConfigError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// List and classify the snapshots in `dir`
///
/// **Public** - main entry point for discovery
///
/// # Errors
/// * Any error from [`validate_samples_dir`]
/// * `ConfigError::ListFailed` - The directory cannot be listed
pub fn discover_snapshots(dir: &Path, format: &SnapshotFormat) -> Result<SnapshotSet, ConfigError> {
    validate_samples_dir(dir)?;

    let list_failed = |source| ConfigError::ListFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut set = SnapshotSet {
        dir: dir.to_path_buf(),
        ..SnapshotSet::default()
    };

    for entry in fs::read_dir(dir).map_err(list_failed)? {
        let path = entry.map_err(list_failed)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        if name.starts_with(format.dump_file_prefix.as_str()) {
            set.dump_files.push(path);
        } else if name.starts_with(format.usage_file_prefix.as_str()) {
            set.usage_files.push(path);
        } else {
            debug!("Ignoring non-snapshot file: {}", name);
        }
    }

    set.dump_files.sort();
    set.usage_files.sort();

    debug!(
        "Found {} dump and {} usage snapshots in {}",
        set.dump_files.len(),
        set.usage_files.len(),
        dir.display()
    );
    Ok(set)
}
