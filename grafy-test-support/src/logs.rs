//! Builders for run-log text in the format the comparison runner writes.

/// Formats one timing line for a file under the `random` topology.
///
/// # Examples
/// ```
/// use grafy_test_support::logs::timing_line;
///
/// assert_eq!(
///     timing_line("k", "exact", (50, 25, 10), 3, "0:00:00:096"),
///     "test_k_input/exact/random/test_n1_050_n2_025_k_010_003.txt: 0:00:00:096",
/// );
/// ```
#[must_use]
pub fn timing_line(
    dimension: &str,
    algorithm: &str,
    (n1, n2, k): (usize, usize, usize),
    index: usize,
    time: &str,
) -> String {
    format!(
        "test_{dimension}_input/{algorithm}/random/test_n1_{n1:03}_n2_{n2:03}_k_{k:03}_{index:03}.txt: {time}"
    )
}

/// Accumulates a run log with a header, timing lines and failure markers.
#[derive(Clone, Debug)]
pub struct RunLogBuilder {
    lines: Vec<String>,
}

impl Default for RunLogBuilder {
    fn default() -> Self {
        Self {
            lines: vec![
                "Execution Log - Started at 2024-01-01 00:00:00".to_owned(),
                "-".repeat(50),
            ],
        }
    }
}

impl RunLogBuilder {
    /// Starts a log with the usual header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a timing line; see [`timing_line`].
    #[must_use]
    pub fn timing(
        mut self,
        dimension: &str,
        algorithm: &str,
        params: (usize, usize, usize),
        index: usize,
        time: &str,
    ) -> Self {
        self.lines
            .push(timing_line(dimension, algorithm, params, index, time));
        self
    }

    /// Appends an arbitrary line.
    #[must_use]
    pub fn line(mut self, text: &str) -> Self {
        self.lines.push(text.to_owned());
        self
    }

    /// The log text, newline terminated.
    #[must_use]
    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
