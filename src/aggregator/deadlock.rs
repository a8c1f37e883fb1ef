//! Deadlock marker bookkeeping.

use crate::parser::schema::DeadlockWarning;
use crate::parser::DeadlockEvent;
use log::warn;

/// Remembers which dump files reported a deadlock
#[derive(Debug, Clone, Default)]
pub struct DeadlockDetector {
    files: Vec<String>,
}

impl DeadlockDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event; repeated markers in one file count once
    pub fn record(&mut self, event: DeadlockEvent) {
        if self.files.contains(&event.source_file) {
            return;
        }
        warn!("Deadlock reported in {}", event.source_file);
        self.files.push(event.source_file);
    }

    /// Affected files, in the order they were processed
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// One warning for the whole run, or `None` if no dump had a deadlock
    ///
    /// The named file is the last affected one in processing order, which
    /// is file-name order rather than capture time.
    pub fn warning(&self) -> Option<DeadlockWarning> {
        let last_file = self.files.last()?;
        Some(DeadlockWarning {
            affected_files: self.files.len(),
            last_file: last_file.clone(),
            files: self.files().to_vec(),
        })
    }
}
