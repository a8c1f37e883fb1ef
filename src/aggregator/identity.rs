//! Thread identity resolution against dump files.
//!
//! Usage snapshots identify threads by decimal id; dump headers carry the
//! same id in hex (`nid=0x1a2b`). For each ranked thread the resolver finds
//! the quoted name on the first header that carries its id and, when stacks
//! are requested, reads the state and frames under every such header.
//!
//! All ranked threads are resolved in a single pass over the dumps.

use super::frequency::{percentage, Histogram};
use crate::parser::dump::{frame_payload, join_frames, parse_state_line};
use crate::parser::lines::for_each_line;
use crate::parser::schema::ThreadStackSample;
use crate::parser::ThreadState;
use crate::utils::config::SnapshotFormat;
use crate::utils::error::ParseError;
use log::debug;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::Path;

/// Lowercase hex form of a decimal thread id, as dump headers print it
pub fn thread_id_hex(thread_id: u64) -> String {
    format!("{:x}", thread_id)
}

/// A dump header line carrying an identity marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLine<'l> {
    /// Normalized hex id: lowercase, no leading zeros
    pub hex: String,

    /// Quoted thread name before the marker, if any
    pub name: Option<&'l str>,
}

/// Find the identity marker on `line` and pull out the hex id and name
pub fn parse_identity_line<'l>(line: &'l str, format: &SnapshotFormat) -> Option<IdentityLine<'l>> {
    let marker_at = line.find(format.identity_marker.as_str())?;
    let digits_at = marker_at + format.identity_marker.len();
    let digits: &str = {
        let rest = &line[digits_at..];
        let end = rest
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let trimmed = digits.trim_start_matches('0');
    let hex = if trimmed.is_empty() { "0" } else { trimmed }.to_ascii_lowercase();

    Some(IdentityLine {
        hex,
        name: quoted_name(&line[..marker_at]),
    })
}

/// Text between the first and last double quote of `prefix`
fn quoted_name(prefix: &str) -> Option<&str> {
    let open = prefix.find('"')?;
    let close = prefix.rfind('"')?;
    (close > open).then(|| &prefix[open + 1..close])
}

/// What the dumps say about one ranked thread
#[derive(Debug, Clone, Default)]
struct ThreadOccurrences {
    name: Option<String>,
    stacks: Histogram<(Option<ThreadState>, Vec<String>)>,
}

/// The lines read under one matching header
#[derive(Debug)]
struct Window {
    slot: usize,
    state: Option<ThreadState>,
    frames: Vec<String>,
}

/// Resolves names and state/stack histograms for a set of thread ids
#[derive(Debug)]
pub struct IdentityResolver<'a> {
    format: &'a SnapshotFormat,
    max_frames: usize,
    collect_stacks: bool,
    wanted: HashMap<String, usize>,
    threads: Vec<ThreadOccurrences>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(
        format: &'a SnapshotFormat,
        thread_ids: &[u64],
        max_frames: usize,
        collect_stacks: bool,
    ) -> Self {
        let mut wanted = HashMap::new();
        let mut threads = Vec::new();
        for &thread_id in thread_ids {
            wanted.entry(thread_id_hex(thread_id)).or_insert_with(|| {
                threads.push(ThreadOccurrences::default());
                threads.len() - 1
            });
        }

        Self {
            format,
            max_frames,
            collect_stacks,
            wanted,
            threads,
        }
    }

    /// Nothing more can be learned from further dumps
    pub fn is_complete(&self) -> bool {
        !self.collect_stacks && self.threads.iter().all(|t| t.name.is_some())
    }

    /// Scan one dump file
    ///
    /// # Errors
    /// * `ParseError::ReadFailed` - The file cannot be read
    pub fn scan_file(&mut self, path: &Path) -> Result<(), ParseError> {
        let mut window = None;
        for_each_line(path, |line| {
            self.feed(&mut window, line);
            ControlFlow::Continue(())
        })?;
        self.close(window.take());
        debug!("{}: scanned for {} thread identities", path.display(), self.wanted.len());
        Ok(())
    }

    /// Scan one dump held in memory
    pub fn scan_text(&mut self, text: &str) {
        let mut window = None;
        for line in text.lines() {
            self.feed(&mut window, line);
        }
        self.close(window.take());
    }

    fn feed(&mut self, window: &mut Option<Window>, line: &str) {
        let format = self.format;

        if let Some(open) = window.as_mut() {
            if line.trim().is_empty() {
                self.close(window.take());
                return;
            }
            if let Some(state) = parse_state_line(line, format) {
                if open.state.is_none() && open.frames.is_empty() {
                    open.state = Some(state);
                }
                return;
            }
            if let Some(payload) = frame_payload(line, format) {
                if open.frames.len() < self.max_frames {
                    open.frames.push(payload.to_string());
                }
                if open.frames.len() >= self.max_frames {
                    self.close(window.take());
                }
                return;
            }
            if format.identity_marker.is_empty() || !line.contains(format.identity_marker.as_str()) {
                return;
            }
            // A new header without a separating blank line ends the window
            self.close(window.take());
        }

        let Some(identity) = parse_identity_line(line, format) else {
            return;
        };
        let Some(&slot) = self.wanted.get(identity.hex.as_str()) else {
            return;
        };

        let thread = &mut self.threads[slot];
        if thread.name.is_none() {
            thread.name = Some(identity.name.unwrap_or_default().to_string());
        }
        if self.collect_stacks {
            *window = Some(Window {
                slot,
                state: None,
                frames: Vec::new(),
            });
        }
    }

    fn close(&mut self, window: Option<Window>) {
        if let Some(window) = window {
            self.threads[window.slot]
                .stacks
                .add((window.state, window.frames));
        }
    }

    fn occurrences_of(&self, thread_id: u64) -> Option<&ThreadOccurrences> {
        self.wanted
            .get(thread_id_hex(thread_id).as_str())
            .map(|&slot| &self.threads[slot])
    }

    /// Thread name, empty when no dump carries the thread's id
    pub fn name(&self, thread_id: u64) -> &str {
        self.occurrences_of(thread_id)
            .and_then(|t| t.name.as_deref())
            .unwrap_or("")
    }

    /// Number of dump entries found for the thread
    pub fn occurrences(&self, thread_id: u64) -> u64 {
        self.occurrences_of(thread_id)
            .map(|t| t.stacks.total())
            .unwrap_or(0)
    }

    /// The `k` most frequent (state, stack) pairs seen for the thread
    pub fn stack_samples(&self, thread_id: u64, k: usize) -> Vec<ThreadStackSample> {
        let Some(thread) = self.occurrences_of(thread_id) else {
            return Vec::new();
        };
        let total = thread.stacks.total();

        thread
            .stacks
            .top_k(k)
            .into_iter()
            .map(|((state, frames), count)| ThreadStackSample {
                count,
                percentage: percentage(count, total),
                state: *state,
                stack: join_frames(frames),
                frames: frames.clone(),
            })
            .collect()
    }
}
