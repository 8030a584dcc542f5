//! Timestamp log loading.
//!
//! Reads the log produced by the periodic recorder (one ISO-8601 timestamp per
//! line) and parses every non-blank line into an [`Instant`].

use std::io::BufRead;
use std::path::Path;

use timelog_core::error::{Result, TimelogError};
use timelog_core::models::Instant;
use timelog_core::time_utils::parse_timestamp;
use tracing::{debug, warn};

// ── ParsePolicy ───────────────────────────────────────────────────────────────

/// What to do with a non-blank line that is not a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Abort the run on the first malformed line.
    #[default]
    FailFast,
    /// Log a warning, skip the line and keep going.
    SkipInvalid,
}

// ── ParsedLog ─────────────────────────────────────────────────────────────────

/// A malformed line dropped under [`ParsePolicy::SkipInvalid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
}

/// Result of parsing a whole log.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// Parsed timestamps in input order.
    pub instants: Vec<Instant>,
    /// Total lines seen, blank ones included.
    pub lines_read: usize,
    pub blank_lines: usize,
    pub skipped: Vec<SkippedLine>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read every line of the log at `path`.
///
/// Both a missing file and a mid-read failure surface as
/// [`TimelogError::FileRead`] carrying the path.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|source| TimelogError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let lines = read_from(std::io::BufReader::new(file)).map_err(|e| match e {
        TimelogError::Io(source) => TimelogError::FileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Read every line from an already-open stream.
///
/// A line that is not valid UTF-8 is decoded lossily instead of failing the
/// read, so it reaches [`parse_lines`] as a malformed line with its own line
/// number and the active [`ParsePolicy`] decides its fate.
pub fn read_from<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    for (index, chunk) in reader.split(b'\n').enumerate() {
        let mut bytes = chunk?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                debug!(line = index + 1, "line is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        lines.push(line);
    }

    Ok(lines)
}

/// Parse raw log lines into instants.
///
/// Blank lines are skipped silently. A malformed line either aborts with
/// [`TimelogError::TimestampParse`] or is skipped with a warning, depending
/// on `policy`.
pub fn parse_lines<I, S>(lines: I, policy: ParsePolicy) -> Result<ParsedLog>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedLog::default();

    for (index, raw) in lines.into_iter().enumerate() {
        let line = index + 1;
        parsed.lines_read += 1;

        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            parsed.blank_lines += 1;
            continue;
        }

        match parse_timestamp(trimmed) {
            Some(instant) => parsed.instants.push(instant),
            None => match policy {
                ParsePolicy::FailFast => {
                    return Err(TimelogError::TimestampParse {
                        line,
                        content: trimmed.to_string(),
                    });
                }
                ParsePolicy::SkipInvalid => {
                    warn!(line, content = trimmed, "skipping malformed timestamp line");
                    parsed.skipped.push(SkippedLine {
                        line,
                        content: trimmed.to_string(),
                    });
                }
            },
        }
    }

    debug!(
        lines = parsed.lines_read,
        timestamps = parsed.instants.len(),
        blank = parsed.blank_lines,
        skipped = parsed.skipped.len(),
        "parsed timestamp log"
    );

    Ok(parsed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
