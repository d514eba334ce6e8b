//! Line grammar of run logs.
//!
//! A timing line looks like
//! `…test_<exp>_input/<algo>/…/test_n1_<n1>_n2_<n2>_k_<k>_<index>.txt: <time>`.
//! The parser splits the path into `/`-separated segments and checks them
//! left to right, so the first qualifying `test_<exp>_input` segment wins.

use std::fmt;

use super::{Algorithm, ExperimentDimension, LogRecord, time::parse_elapsed_ms};

const FILE_SUFFIX: &str = ".txt:";
const EXPERIMENT_PREFIX: &str = "test_";
const EXPERIMENT_SUFFIX: &str = "_input";

/// Reason a log line was not accepted as a timing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRejection {
    /// No `.txt:` separator.
    MissingTestFile,
    /// The file name is not `test_n1_<n1>_n2_<n2>_k_<k>_<index>`.
    MalformedFileName,
    /// No `test_<exp>_input` directory.
    MissingExperiment,
    /// The experiment directory is not followed by `exact/` or `approx/`
    /// and at least one more directory level.
    MissingAlgorithm,
    /// The separator is not followed by whitespace and a time string.
    MissingTime,
}

impl LineRejection {
    /// Stable identifier used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingTestFile => "missing_test_file",
            Self::MalformedFileName => "malformed_file_name",
            Self::MissingExperiment => "missing_experiment",
            Self::MissingAlgorithm => "missing_algorithm",
            Self::MissingTime => "missing_time",
        }
    }
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one log line into a [`LogRecord`].
///
/// A time string that is present but not convertible (for example a lone
/// `0:00`) still yields a record, with `elapsed_ms` set to `None`.
///
/// When the line holds several `.txt:` separators, each is tried from the
/// left until one yields a record.
///
/// # Errors
/// Returns the [`LineRejection`] of the first candidate when none parses.
///
/// # Examples
/// ```
/// use grafy_core::{Algorithm, ExperimentDimension, parse_line};
///
/// let record = parse_line(
///     "test_k_input/exact/random/test_n1_050_n2_025_k_010_003.txt: 0:00:00:096",
/// )?;
/// assert_eq!(record.dimension, ExperimentDimension::K);
/// assert_eq!(record.algorithm, Algorithm::Exact);
/// assert_eq!((record.n1, record.n2, record.k), (50, 25, 10));
/// assert_eq!(record.elapsed_ms, Some(96));
/// # Ok::<(), grafy_core::LineRejection>(())
/// ```
pub fn parse_line(line: &str) -> Result<LogRecord, LineRejection> {
    // Each `.txt:` is a candidate end of the path; the leftmost one that
    // parses wins, and the first rejection is reported otherwise.
    let mut first_rejection = None;
    for (at, _) in line.match_indices(FILE_SUFFIX) {
        let path = line.get(..at).unwrap_or_default();
        let rest = line.get(at.saturating_add(FILE_SUFFIX.len())..).unwrap_or_default();
        match parse_candidate(path, rest) {
            Ok(record) => return Ok(record),
            Err(reason) => {
                first_rejection.get_or_insert(reason);
            }
        }
    }
    Err(first_rejection.unwrap_or(LineRejection::MissingTestFile))
}

fn parse_candidate(path: &str, rest: &str) -> Result<LogRecord, LineRejection> {
    let segments: Vec<&str> = path.split('/').collect();
    let (file_name, directories) = segments
        .split_last()
        .ok_or(LineRejection::MalformedFileName)?;
    let (n1, n2, k) = parse_file_name(file_name).ok_or(LineRejection::MalformedFileName)?;
    let (dimension, algorithm) = locate_experiment(directories)?;
    let time = parse_time_field(rest).ok_or(LineRejection::MissingTime)?;

    Ok(LogRecord {
        dimension,
        algorithm,
        n1,
        n2,
        k,
        elapsed_ms: parse_elapsed_ms(time),
    })
}

/// Finds the first `test_<exp>_input/<algo>/<dir>/` run among `directories`.
fn locate_experiment(
    directories: &[&str],
) -> Result<(ExperimentDimension, Algorithm), LineRejection> {
    let mut saw_experiment = false;
    for (index, segment) in directories.iter().enumerate() {
        let Some(label) = experiment_label(segment) else {
            continue;
        };
        saw_experiment = true;
        // The algorithm directory must be followed by at least one more
        // directory before the file name.
        let algorithm = directories
            .get(index.saturating_add(1))
            .and_then(|name| Algorithm::from_label(name));
        let has_inner_dir = directories.len() > index.saturating_add(2);
        if let (Some(algorithm), true) = (algorithm, has_inner_dir) {
            return Ok((ExperimentDimension::from_label(label), algorithm));
        }
    }
    Err(if saw_experiment {
        LineRejection::MissingAlgorithm
    } else {
        LineRejection::MissingExperiment
    })
}

/// Extracts `<exp>` from a segment containing `test_<exp>_input` at its end,
/// preferring the leftmost `test_`.
fn experiment_label(segment: &str) -> Option<&str> {
    let head = segment.strip_suffix(EXPERIMENT_SUFFIX)?;
    head.match_indices(EXPERIMENT_PREFIX).find_map(|(start, _)| {
        let label = head.get(start.saturating_add(EXPERIMENT_PREFIX.len())..)?;
        is_word(label).then_some(label)
    })
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Parses `test_n1_<n1>_n2_<n2>_k_<k>_<index>`.
fn parse_file_name(name: &str) -> Option<(usize, usize, usize)> {
    let rest = name.strip_prefix("test_n1_")?;
    let (n1, rest) = rest.split_once("_n2_")?;
    let (n2, rest) = rest.split_once("_k_")?;
    let (k, index) = rest.split_once('_')?;
    if !is_digits(index) {
        return None;
    }
    Some((parse_digits(n1)?, parse_digits(n2)?, parse_digits(k)?))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_digits(text: &str) -> Option<usize> {
    if is_digits(text) { text.parse().ok() } else { None }
}

/// Returns the run of digits and colons following mandatory whitespace.
fn parse_time_field(rest: &str) -> Option<&str> {
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }
    let end = trimmed
        .find(|ch: char| !(ch.is_ascii_digit() || ch == ':'))
        .unwrap_or(trimmed.len());
    trimmed.get(..end).filter(|time| !time.is_empty())
}
