//! Line-by-line reading of snapshot files.
//!
//! Snapshots are produced by external tools and may carry bytes that are not
//! valid UTF-8 (thread names, native frames). Lines are decoded lossily so a
//! stray byte never aborts a run.

use crate::utils::error::ParseError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::Path;

/// Feed every line of `path` to `visit`, without its line terminator
///
/// Stops early when `visit` returns `ControlFlow::Break`.
///
/// # Errors
/// * `ParseError::ReadFailed` - The file cannot be opened or read
pub fn for_each_line<F>(path: &Path, mut visit: F) -> Result<(), ParseError>
where
    F: FnMut(&str) -> ControlFlow<()>,
{
    let file = File::open(path).map_err(|e| ParseError::read_failed(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ParseError::read_failed(path, e))?;
        if read == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if visit(line).is_break() {
            return Ok(());
        }
    }
}

/// File name used to tag records and events coming from `path`
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_strips_terminators_and_decodes_lossily() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"first\r\nsec\xffond\nlast").unwrap();

        let mut lines = Vec::new();
        for_each_line(file.path(), |line| {
            lines.push(line.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();

        assert_eq!(lines, vec!["first", "sec\u{fffd}ond", "last"]);
    }

    #[test]
    fn test_break_stops_reading() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a\nb\nc\n").unwrap();

        let mut seen = 0;
        for_each_line(file.path(), |_| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        assert_eq!(seen, 2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = for_each_line(Path::new("/nonexistent/jstack.1"), |_| {
            ControlFlow::Continue(())
        });
        assert!(matches!(result, Err(ParseError::ReadFailed { .. })));
    }
}
