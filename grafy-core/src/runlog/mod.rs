//! Timing records extracted from comparison-program run logs.

mod grammar;
mod time;

use std::{fmt, fs, path::Path};

use tracing::{debug, info, instrument, warn};

use crate::error::RunLogError;

pub use grammar::{LineRejection, parse_line};
pub use time::{format_elapsed, parse_elapsed_ms};

/// Which comparison algorithm produced a timing, also used as the corpus
/// mode directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// Exact algorithm.
    Exact,
    /// Approximate algorithm, selected with `-a`.
    Approx,
}

impl Algorithm {
    /// Both algorithms, exact first.
    pub const ALL: [Self; 2] = [Self::Exact, Self::Approx];

    /// Lowercase name as it appears in paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Approx => "approx",
        }
    }

    /// Capitalised name for chart titles and legends.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Exact => "Exact",
            Self::Approx => "Approx",
        }
    }

    /// Parses a path segment naming an algorithm.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "exact" => Some(Self::Exact),
            "approx" => Some(Self::Approx),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parameter varied by an experiment, taken from `test_<exp>_input`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExperimentDimension {
    /// Vertex count of graph A varies.
    N1,
    /// Vertex count of graph B varies.
    N2,
    /// The parameter `k` varies.
    K,
    /// Any other label; such records are averaged but never charted.
    Other(String),
}

impl ExperimentDimension {
    /// Maps a directory label onto a dimension.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "n1" => Self::N1,
            "n2" => Self::N2,
            "k" => Self::K,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The label as written in directory names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::N1 => "n1",
            Self::N2 => "n2",
            Self::K => "k",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for ExperimentDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timing line of a run log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Experiment the test file belongs to.
    pub dimension: ExperimentDimension,
    /// Algorithm that was timed.
    pub algorithm: Algorithm,
    /// Vertex count of graph A.
    pub n1: usize,
    /// Vertex count of graph B.
    pub n2: usize,
    /// Parameter `k`.
    pub k: usize,
    /// Wall time in milliseconds; `None` when the time string was malformed.
    pub elapsed_ms: Option<u64>,
}

/// Result of parsing a whole log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedLog {
    /// Accepted records in line order.
    pub records: Vec<LogRecord>,
    /// Number of lines that did not match the grammar.
    pub skipped_lines: usize,
}

impl ParsedLog {
    /// Returns `true` when no line matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses every line of `text`, skipping lines that do not match.
///
/// # Examples
/// ```
/// use grafy_core::parse_log_str;
///
/// let log = parse_log_str(
///     "Execution Log\n\
///      test_k_input/exact/random/test_n1_050_n2_025_k_010_003.txt: 0:00:00:096\n",
/// );
/// assert_eq!(log.records.len(), 1);
/// assert_eq!(log.skipped_lines, 1);
/// ```
#[must_use]
pub fn parse_log_str(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    for (index, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(record) => {
                if record.elapsed_ms.is_none() {
                    debug!(line = index.saturating_add(1), "time field not convertible");
                }
                parsed.records.push(record);
            }
            Err(reason) => {
                debug!(line = index.saturating_add(1), reason = reason.as_str(), "skipping log line");
                parsed.skipped_lines = parsed.skipped_lines.saturating_add(1);
            }
        }
    }
    parsed
}

/// Reads and parses the log at `path`.
///
/// An empty result is logged as "no data" and returned normally.
///
/// # Errors
/// Returns [`RunLogError::Read`] when the file cannot be read.
#[instrument(name = "runlog.parse_file", err, fields(path = %path.display()))]
pub fn parse_log_file(path: &Path) -> Result<ParsedLog, RunLogError> {
    let text = fs::read_to_string(path).map_err(|source| RunLogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_log_str(&text);
    if parsed.is_empty() {
        warn!(skipped = parsed.skipped_lines, "no data: no line matched the timing grammar");
    } else {
        info!(
            records = parsed.records.len(),
            skipped = parsed.skipped_lines,
            "parsed run log"
        );
    }
    Ok(parsed)
}
