//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use analyze::{analyze_cpu, analyze_states, execute_analyze, validate_args, StateAnalysis};
pub use models::AnalyzeArgs;
pub use utils::{display_formats, display_version, format_to_toml};
