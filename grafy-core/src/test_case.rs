//! Test cases for the comparison program and their text format.
//!
//! A file holds graph A, graph B and the parameter `k`:
//!
//! ```text
//! <n1>
//! <n1 rows of n1 space-separated multiplicities>
//! <n2>
//! <n2 rows of n2 space-separated multiplicities>
//! <k>
//! ```
//!
//! Lines are separated by `\n` and the file carries no trailing newline.

use std::{fmt, num::NonZeroUsize, str::FromStr};

use crate::{
    error::TestCaseParseError,
    matrix::{AdjacencyMatrix, Multiplicity},
};

/// Two graphs and the parameter `k` handed to the comparison program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    graph_a: AdjacencyMatrix,
    graph_b: AdjacencyMatrix,
    k: NonZeroUsize,
}

impl TestCase {
    /// Bundles two graphs with `k`.
    #[must_use]
    pub const fn new(graph_a: AdjacencyMatrix, graph_b: AdjacencyMatrix, k: NonZeroUsize) -> Self {
        Self {
            graph_a,
            graph_b,
            k,
        }
    }

    /// First graph, of size `n1`.
    #[must_use]
    pub const fn graph_a(&self) -> &AdjacencyMatrix {
        &self.graph_a
    }

    /// Second graph, of size `n2`.
    #[must_use]
    pub const fn graph_b(&self) -> &AdjacencyMatrix {
        &self.graph_b
    }

    /// The comparison parameter.
    #[must_use]
    pub const fn k(&self) -> NonZeroUsize {
        self.k
    }
}

fn write_matrix(f: &mut fmt::Formatter<'_>, matrix: &AdjacencyMatrix) -> fmt::Result {
    write!(f, "{}", matrix.order())?;
    for row in matrix.rows() {
        f.write_str("\n")?;
        for (column, value) in row.iter().enumerate() {
            if column > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
    }
    Ok(())
}

impl fmt::Display for TestCase {
    /// Renders the test-case file format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_matrix(f, &self.graph_a)?;
        f.write_str("\n")?;
        write_matrix(f, &self.graph_b)?;
        write!(f, "\n{}", self.k)
    }
}

/// Line cursor tracking one-based line numbers for diagnostics.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.lines().enumerate(),
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<(usize, &'a str), TestCaseParseError> {
        self.inner
            .next()
            .map(|(index, line)| (index.saturating_add(1), line))
            .ok_or(TestCaseParseError::UnexpectedEnd { expected })
    }

    fn next_number(&mut self, expected: &'static str) -> Result<(usize, usize), TestCaseParseError> {
        let (line, text) = self.next_line(expected)?;
        let value = parse_token(line, text.trim())?;
        Ok((line, value))
    }

    fn matrix(&mut self) -> Result<AdjacencyMatrix, TestCaseParseError> {
        let (_, order) = self.next_number("matrix size")?;
        // The declared size is untrusted; rows are only stored once read.
        let mut rows = Vec::new();
        for _ in 0..order {
            let (line, text) = self.next_line("matrix row")?;
            let row = text
                .split_whitespace()
                .map(|token| parse_token(line, token))
                .collect::<Result<Vec<Multiplicity>, _>>()?;
            if row.len() != order {
                return Err(TestCaseParseError::RowLength {
                    line,
                    expected: order,
                    actual: row.len(),
                });
            }
            rows.push(row);
        }
        // Row lengths were checked above, so the rows always form a square.
        AdjacencyMatrix::from_rows(rows).map_err(|err| TestCaseParseError::RowLength {
            line: err.row,
            expected: err.expected,
            actual: err.actual,
        })
    }

    fn ensure_exhausted(&mut self) -> Result<(), TestCaseParseError> {
        match self.inner.find(|(_, line)| !line.trim().is_empty()) {
            Some((index, _)) => Err(TestCaseParseError::TrailingContent {
                line: index.saturating_add(1),
            }),
            None => Ok(()),
        }
    }
}

fn parse_token<T: FromStr>(line: usize, token: &str) -> Result<T, TestCaseParseError> {
    token.parse().map_err(|_| TestCaseParseError::InvalidNumber {
        line,
        token: token.to_owned(),
    })
}

impl FromStr for TestCase {
    type Err = TestCaseParseError;

    /// Parses the test-case file format. A trailing newline is tolerated.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::TestCase;
    ///
    /// let case: TestCase = "2\n0 1\n0 0\n1\n0\n2".parse()?;
    /// assert_eq!(case.graph_a().edge_count(), 1);
    /// assert_eq!(case.graph_b().order(), 1);
    /// assert_eq!(case.k().get(), 2);
    /// assert_eq!(case.to_string(), "2\n0 1\n0 0\n1\n0\n2");
    /// # Ok::<(), grafy_core::TestCaseParseError>(())
    /// ```
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut lines = Lines::new(input);
        let graph_a = lines.matrix()?;
        let graph_b = lines.matrix()?;
        let (line, raw_k) = lines.next_number("k")?;
        let k = NonZeroUsize::new(raw_k).ok_or(TestCaseParseError::ZeroK { line })?;
        lines.ensure_exhausted()?;
        Ok(Self::new(graph_a, graph_b, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn nz(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).expect("test values are non-zero")
    }

    #[test]
    fn renders_empty_graphs() {
        let case = TestCase::new(AdjacencyMatrix::zeroed(0), AdjacencyMatrix::zeroed(0), nz(1));
        assert_eq!(case.to_string(), "0\n0\n1");
        let parsed: TestCase = "0\n0\n1".parse().expect("empty graphs must parse");
        assert_eq!(parsed, case);
    }

    #[test]
    fn renders_rows_space_separated() {
        let graph_a = AdjacencyMatrix::from_rows(vec![vec![0, 3, 1], vec![2, 0, 0], vec![0, 0, 0]])
            .expect("square rows");
        let graph_b = AdjacencyMatrix::from_rows(vec![vec![0, 1], vec![1, 0]]).expect("square rows");
        let case = TestCase::new(graph_a, graph_b, nz(4));
        assert_eq!(case.to_string(), "3\n0 3 1\n2 0 0\n0 0 0\n2\n0 1\n1 0\n4");
    }

    #[rstest]
    #[case::missing_k("1\n0\n1\n0", TestCaseParseError::UnexpectedEnd { expected: "k" })]
    #[case::short_row(
        "2\n0 1\n0\n1\n0\n1",
        TestCaseParseError::RowLength { line: 3, expected: 2, actual: 1 },
    )]
    #[case::negative(
        "1\n-1\n1\n0\n1",
        TestCaseParseError::InvalidNumber { line: 2, token: "-1".to_owned() },
    )]
    #[case::zero_k("1\n0\n1\n0\n0", TestCaseParseError::ZeroK { line: 5 })]
    #[case::trailing("1\n0\n1\n0\n1\n7", TestCaseParseError::TrailingContent { line: 6 })]
    #[case::huge_size(
        "18446744073709551615\n0\n1\n0\n1",
        TestCaseParseError::RowLength { line: 2, expected: usize::MAX, actual: 1 },
    )]
    #[case::size_beyond_input(
        "1000000000\n",
        TestCaseParseError::UnexpectedEnd { expected: "matrix row" },
    )]
    fn rejects_malformed_input(#[case] input: &str, #[case] expected: TestCaseParseError) {
        let err = input.parse::<TestCase>().expect_err("input must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn tolerates_trailing_newline() {
        let parsed: TestCase = "1\n0\n1\n0\n3\n".parse().expect("trailing newline is fine");
        assert_eq!(parsed.k(), nz(3));
    }
}
