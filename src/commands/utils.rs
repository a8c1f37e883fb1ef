use crate::utils::config::{SnapshotFormat, SCHEMA_VERSION};
use crate::utils::error::ConfigError;

/// Render the snapshot format as a TOML document
///
/// The output is a valid `--config` file, so it doubles as a template.
pub fn format_to_toml(format: &SnapshotFormat) -> Result<String, ConfigError> {
    toml::to_string_pretty(format)
        .map_err(|e| ConfigError::InvalidArgument(format!("cannot render format: {}", e)))
}

/// Display the recognised snapshot format
pub fn display_formats(format: &SnapshotFormat) -> Result<(), ConfigError> {
    println!("Thread Census Snapshot Format");
    println!();
    println!("Dump snapshots:  files named {}*", format.dump_file_prefix);
    println!("Usage snapshots: files named {}*", format.usage_file_prefix);
    println!();
    println!("Usage rows: CPU% in field 1, decimal thread id in field 6,");
    println!("            reading stops at the first row with 0.0 CPU");
    println!();
    println!("Pass a file like the following to `analyze --config`:");
    println!();
    print!("{}", format_to_toml(format)?);
    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Thread Census v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Thread state and CPU hot-spot analysis for periodic thread dumps.");
}
