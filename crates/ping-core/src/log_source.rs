//! Reader for the on-disk ping log.
//!
//! The pinger appends one line per ping to a daily file named `YYMMDD.txt`:
//!
//! ```text
//! 1626457680 11.5
//! 1626457740 1000
//! ```
//!
//! i.e. `<epoch seconds> <latency ms>`, oldest first. This module turns a
//! directory of such files into a newest-first [`Sample`] sequence, which is
//! the order the aggregator expects.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::PingError;
use crate::time_util::SECOND_MS;
use crate::types::Sample;

/// Default number of samples a query returns (one hour at one ping a minute).
pub const DEFAULT_QUERY_COUNT: usize = 60;

/// Selection applied while walking the log newest to oldest.
///
/// Times are epoch milliseconds; `0` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogQuery {
    /// Samples to skip after `start` has been applied.
    pub offset: usize,
    /// Maximum number of samples returned.
    pub count: usize,
    /// Newer bound: samples at or after `start` are skipped.
    pub start: i64,
    /// Older bound: reading stops at the first sample before `end`.
    pub end: i64,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self { offset: 0, count: DEFAULT_QUERY_COUNT, start: 0, end: 0 }
    }
}

impl LogQuery {
    /// Reject ranges whose newer bound lies before the older one.
    pub fn validate(&self) -> Result<(), PingError> {
        if self.start != 0 && self.end != 0 && self.start < self.end {
            return Err(PingError::InvalidQuery { start: self.start, end: self.end });
        }
        Ok(())
    }
}

/// Whether `name` looks like a daily log file (`YYMMDD.txt`).
pub fn is_log_file(name: &str) -> bool {
    name.len() == 10
        && name.ends_with(".txt")
        && name.as_bytes()[..6].iter().all(u8::is_ascii_digit)
}

/// Names of the log files in `dir`, oldest first.
///
/// An unreadable directory is logged and treated as empty.
pub fn log_files(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot list log dir {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok().map(|e| e.file_name().to_string_lossy().into_owned()))
        .filter(|name| is_log_file(name))
        .collect();
    files.sort_unstable();
    files
}

/// Parse one `<epoch seconds> <latency ms>` line.
pub fn parse_line(line: &str) -> Option<Sample> {
    let (time, latency) = line.trim().split_once(char::is_whitespace)?;
    let secs: i64 = time.parse().ok()?;
    let latency: f64 = fast_float2::parse(latency.trim()).ok()?;
    if !latency.is_finite() || latency < 0.0 {
        return None;
    }
    Some(Sample::new(secs.checked_mul(SECOND_MS)?, latency))
}

/// Parse a whole log file body, returning samples newest first.
///
/// Blank lines are ignored; malformed lines are skipped.
pub fn parse_log(input: &str) -> Vec<Sample> {
    let mut skipped = 0usize;
    let mut samples: Vec<Sample> = input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let sample = parse_line(line);
            if sample.is_none() {
                skipped += 1;
            }
            sample
        })
        .collect();
    if skipped > 0 {
        debug!("skipped {skipped} malformed log line(s)");
    }
    samples.reverse();
    samples
}

/// Read and parse one log file from `dir`.
pub fn read_log_file(dir: &Path, name: &str) -> Result<Vec<Sample>, PingError> {
    let path = dir.join(name);
    let input = fs::read_to_string(&path)
        .map_err(|e| PingError::Log(format!("{}: {e}", path.display())))?;
    Ok(parse_log(&input))
}

/// All samples in `dir`, newest first. Files are opened lazily, so a query
/// that stops early never touches older files.
fn read_log_all(dir: &Path) -> impl Iterator<Item = Sample> {
    let dir = dir.to_owned();
    let mut files = log_files(&dir);
    files.reverse();
    files.into_iter().flat_map(move |name| match read_log_file(&dir, &name) {
        Ok(samples) => samples,
        Err(e) => {
            warn!("skipping unreadable log file: {e}");
            Vec::new()
        }
    })
}

/// Run `query` against the log directory, newest sample first.
pub fn read_log(dir: &Path, query: &LogQuery) -> Result<Vec<Sample>, PingError> {
    query.validate()?;
    let LogQuery { offset, count, start, end } = *query;

    let samples: Vec<Sample> = read_log_all(dir)
        .skip_while(|s| start != 0 && s.time_ms >= start)
        .skip(offset)
        .take(count)
        .take_while(|s| end == 0 || s.time_ms >= end)
        .collect();

    debug!("read {} sample(s) from {} ({query:?})", samples.len(), dir.display());
    Ok(samples)
}
