//! SVG flamegraph generation using the inferno library.
//!
//! Each collapsed stack is a thread state followed by the sampled frames,
//! root first. Widths are sample counts, so the graph shows where threads
//! spent their time across every dump of a run.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Thread Samples by State".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - There is nothing to draw
/// * `FlamegraphError::RenderFailed` - inferno failed to render
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_folded_line).collect();

    let mut options = Options::default();
    options.title = config.title;
    options.count_name = "samples".to_string();
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    let svg = String::from_utf8(svg)?;
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stacks_rejected() {
        assert!(matches!(
            generate_flamegraph(&[], None),
            Err(FlamegraphError::EmptyStacks)
        ));
    }

    #[test]
    fn test_renders_svg() {
        let stacks = vec![
            CollapsedStack::new("WAITING;Thread.run;Object.wait".to_string(), 3),
            CollapsedStack::new("RUNNABLE;Thread.run;Socket.read".to_string(), 1),
        ];
        let config = FlamegraphConfig::new().with_title("jstack samples");
        let svg = generate_flamegraph(&stacks, Some(&config)).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("jstack samples"));
    }
}
