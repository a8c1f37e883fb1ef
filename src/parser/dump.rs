//! Thread-dump snapshot parser.
//!
//! A dump is a sequence of blank-line separated blocks. Each block starts
//! with a header line naming the thread, then a line declaring its
//! lifecycle state, then its stack frames:
//!
//! ```text
//! "worker-1" #12 prio=5 os_prio=0 tid=0x00007f0c4800a800 nid=0x1a2b runnable
//!    java.lang.Thread.State: RUNNABLE
//! 	at com.example.Worker.poll(Worker.java:88)
//! 	at com.example.Worker.run(Worker.java:42)
//!
//! ```
//!
//! The parser is a two-state machine: it looks for a state line, then
//! collects frame lines until the blank line that closes the block.

use super::lines::{for_each_line, source_name};
use super::thread_state::ThreadState;
use crate::utils::config::{SnapshotFormat, SIGNATURE_SEPARATOR};
use crate::utils::error::ParseError;
use log::debug;
use std::mem;
use std::ops::ControlFlow;
use std::path::Path;

/// One thread block of a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub state: ThreadState,

    /// Frame payloads, innermost first, truncated to the frame cap
    pub frames: Vec<String>,

    /// Number of frame lines seen, including truncated ones
    pub frame_count: usize,

    pub source_file: String,
}

impl ThreadRecord {
    /// Canonical grouping key for this record's stack shape
    pub fn signature(&self) -> String {
        join_frames(&self.frames)
    }
}

/// Join frames into a stack signature
pub fn join_frames(frames: &[String]) -> String {
    frames.join(SIGNATURE_SEPARATOR)
}

/// A dump file contained the deadlock marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlockEvent {
    pub source_file: String,
}

/// Something the parser found, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpEvent {
    Record(ThreadRecord),
    Deadlock(DeadlockEvent),
}

#[derive(Debug)]
enum ParserState {
    SeekingState,
    CollectingFrames {
        state: ThreadState,
        frames: Vec<String>,
        frame_count: usize,
    },
}

/// Streaming parser for one dump file
///
/// Feed it lines in order; it hands back events as blocks close.
#[derive(Debug)]
pub struct DumpParser<'a> {
    format: &'a SnapshotFormat,
    max_frames: usize,
    source_file: String,
    state: ParserState,
}

impl<'a> DumpParser<'a> {
    pub fn new(format: &'a SnapshotFormat, max_frames: usize, source_file: impl Into<String>) -> Self {
        Self {
            format,
            max_frames,
            source_file: source_file.into(),
            state: ParserState::SeekingState,
        }
    }

    /// Advance the state machine by one line
    pub fn feed(&mut self, line: &str) -> Option<DumpEvent> {
        if line.trim().is_empty() {
            return self.close_block();
        }

        if is_deadlock_line(line, self.format) {
            return Some(DumpEvent::Deadlock(DeadlockEvent {
                source_file: self.source_file.clone(),
            }));
        }

        match &mut self.state {
            ParserState::SeekingState => {
                if let Some(state) = parse_state_line(line, self.format) {
                    self.state = ParserState::CollectingFrames {
                        state,
                        frames: Vec::new(),
                        frame_count: 0,
                    };
                }
            }
            ParserState::CollectingFrames {
                frames,
                frame_count,
                ..
            } => {
                if let Some(payload) = frame_payload(line, self.format) {
                    *frame_count += 1;
                    if frames.len() < self.max_frames {
                        frames.push(payload.to_string());
                    }
                }
            }
        }

        None
    }

    /// End of input; returns true when an unterminated block was dropped
    ///
    /// Blocks are only ever closed by a blank line, so a trailing block
    /// without one is discarded rather than flushed.
    pub fn finish(self) -> bool {
        matches!(
            self.state,
            ParserState::CollectingFrames { frame_count, .. } if frame_count > 0
        )
    }

    fn close_block(&mut self) -> Option<DumpEvent> {
        match mem::replace(&mut self.state, ParserState::SeekingState) {
            ParserState::CollectingFrames {
                state,
                frames,
                frame_count,
            } if frame_count > 0 => Some(DumpEvent::Record(ThreadRecord {
                state,
                frames,
                frame_count,
                source_file: self.source_file.clone(),
            })),
            _ => None,
        }
    }
}

/// Counts reported after a dump file has been scanned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpFileStats {
    pub records: usize,
    pub deadlocks: usize,
    pub dropped_trailing_block: bool,
}

/// Parse one dump file, handing each event to `sink` as it is produced
///
/// **Public** - main entry point for dump parsing
///
/// # Errors
/// * `ParseError::ReadFailed` - The file cannot be read
pub fn scan_dump_file<F>(
    path: &Path,
    format: &SnapshotFormat,
    max_frames: usize,
    mut sink: F,
) -> Result<DumpFileStats, ParseError>
where
    F: FnMut(DumpEvent),
{
    let mut parser = DumpParser::new(format, max_frames, source_name(path));
    let mut stats = DumpFileStats::default();

    for_each_line(path, |line| {
        if let Some(event) = parser.feed(line) {
            match &event {
                DumpEvent::Record(_) => stats.records += 1,
                DumpEvent::Deadlock(_) => stats.deadlocks += 1,
            }
            sink(event);
        }
        ControlFlow::Continue(())
    })?;

    stats.dropped_trailing_block = parser.finish();
    if stats.dropped_trailing_block {
        debug!("{}: dropped unterminated trailing block", path.display());
    }

    Ok(stats)
}

/// Parse a whole dump held in memory
pub fn parse_dump(
    text: &str,
    format: &SnapshotFormat,
    max_frames: usize,
    source_file: &str,
) -> Vec<DumpEvent> {
    let mut parser = DumpParser::new(format, max_frames, source_file);
    text.lines().filter_map(|line| parser.feed(line)).collect()
}

/// Extract the state token from a state-declaration line
///
/// `java.lang.Thread.State: TIMED_WAITING (sleeping)` yields
/// `TimedWaiting`; unknown tokens yield `None`.
pub fn parse_state_line(line: &str, format: &SnapshotFormat) -> Option<ThreadState> {
    line.trim_start()
        .strip_prefix(format.state_prefix.as_str())?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

/// Frame text after the frame prefix, if `line` is a frame line
pub fn frame_payload<'l>(line: &'l str, format: &SnapshotFormat) -> Option<&'l str> {
    line.trim_start()
        .strip_prefix(format.frame_prefix.as_str())
        .map(str::trim_end)
}

pub fn is_deadlock_line(line: &str, format: &SnapshotFormat) -> bool {
    !format.deadlock_marker.is_empty() && line.contains(format.deadlock_marker.as_str())
}
