//! Configuration and constants for the CLI.
//!
//! The snapshot format (file prefixes and textual markers) defaults to
//! jstack dumps paired with `top -H` style usage captures, and can be
//! overridden from a TOML file when the capture tooling drifts.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

pub const DEFAULT_STACK_TRACE_SAMPLES: usize = 5;
pub const DEFAULT_STACK_TRACE_LINES: usize = 100;
pub const DEFAULT_DISPLAY_WIDTH: usize = 100;
pub const DEFAULT_NUMBER_OF_THREADS: usize = 100;

/// Separator used when joining frames into a stack signature
pub const SIGNATURE_SEPARATOR: &str = ";";

/// Textual layout of the captured snapshot files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotFormat {
    /// File-name prefix of thread-dump snapshots
    pub dump_file_prefix: String,

    /// File-name prefix of CPU-usage snapshots
    pub usage_file_prefix: String,

    /// Prefix of the line declaring a thread's lifecycle state
    pub state_prefix: String,

    /// Prefix of a stack-frame line (after leading whitespace)
    pub frame_prefix: String,

    /// Marker embedding the hex thread identity in a dump header line
    pub identity_marker: String,

    /// Phrase printed by the dumper when it detects a deadlock
    pub deadlock_marker: String,
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self {
            dump_file_prefix: "jstack".to_string(),
            usage_file_prefix: "top".to_string(),
            state_prefix: "java.lang.Thread.State:".to_string(),
            frame_prefix: "at ".to_string(),
            identity_marker: "nid=0x".to_string(),
            deadlock_marker: "Found one Java-level deadlock".to_string(),
        }
    }
}

impl SnapshotFormat {
    /// Load a format description from a TOML file
    ///
    /// Keys missing from the file keep their default values.
    ///
    /// # Errors
    /// * `ConfigError::IoError` - If the file cannot be read
    /// * `ConfigError::InvalidFormatFile` - If the TOML is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a format description from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let format: SnapshotFormat = toml::from_str(contents)?;
        if format.frame_prefix.is_empty() || format.identity_marker.is_empty() {
            return Err(ConfigError::InvalidArgument(
                "frame_prefix and identity_marker cannot be empty".to_string(),
            ));
        }
        Ok(format)
    }
}
