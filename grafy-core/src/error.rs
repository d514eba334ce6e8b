//! Error types for the grafy core library.
//!
//! Corpus errors carry stable machine-readable codes so the CLI can log them
//! as structured fields; the remaining enums describe parse failures.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Rows handed to [`crate::AdjacencyMatrix::from_rows`] did not form a square.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("row {row} has {actual} entries but the matrix has {expected} rows")]
pub struct MatrixError {
    /// Zero-based index of the offending row.
    pub row: usize,
    /// Number of rows, which every row length must match.
    pub expected: usize,
    /// Number of entries found in the row.
    pub actual: usize,
}

/// A test-case file could not be parsed back into a [`crate::TestCase`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TestCaseParseError {
    /// The input ended before the named field was read.
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEnd {
        /// Field that was still expected.
        expected: &'static str,
    },
    /// A token was not a non-negative integer.
    #[error("line {line}: `{token}` is not a non-negative integer")]
    InvalidNumber {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A matrix row had the wrong number of entries.
    #[error("line {line}: expected {expected} entries, found {actual}")]
    RowLength {
        /// One-based line number.
        line: usize,
        /// Entries required by the declared matrix size.
        expected: usize,
        /// Entries present on the line.
        actual: usize,
    },
    /// The trailing parameter was zero.
    #[error("line {line}: k must be at least 1")]
    ZeroK {
        /// One-based line number.
        line: usize,
    },
    /// Non-blank content followed the parameter line.
    #[error("line {line}: unexpected trailing content")]
    TrailingContent {
        /// One-based line number.
        line: usize,
    },
}

/// Errors raised while writing or reading a test corpus.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CorpusError {
    /// An output directory could not be created.
    #[error("failed to create directory `{path}`: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A test-case file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A test-case file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A test-case file was malformed.
    #[error("malformed test case `{path}`: {source}")]
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: TestCaseParseError,
    },
}

define_error_codes! {
    /// Stable codes describing [`CorpusError`] variants.
    enum CorpusErrorCode for CorpusError {
        /// An output directory could not be created.
        CreateDir => CreateDir { .. } => "CORPUS_CREATE_DIR",
        /// A test-case file could not be written.
        Write => Write { .. } => "CORPUS_WRITE",
        /// A test-case file could not be read.
        Read => Read { .. } => "CORPUS_READ",
        /// A test-case file was malformed.
        Malformed => Malformed { .. } => "CORPUS_MALFORMED",
    }
}

/// Errors raised while loading a sweep configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SweepConfigError {
    /// The configuration file could not be read.
    #[error("failed to read sweep configuration `{path}`: {source}")]
    Read {
        /// Configuration path.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The configuration was not valid TOML for a sweep.
    #[error("invalid sweep configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A `k` value of zero was listed.
    #[error("sweep mode `{mode}` lists k = 0; k must be at least 1")]
    ZeroK {
        /// Mode section containing the value.
        mode: &'static str,
    },
    /// The per-configuration sample count was zero.
    #[error("sweep sample count must be at least 1")]
    ZeroCount,
}

/// Errors raised while reading a run log.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RunLogError {
    /// The log file could not be read.
    #[error("failed to read run log `{path}`: {source}")]
    Read {
        /// Log path.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_codes_are_stable() {
        let err = CorpusError::CreateDir {
            path: PathBuf::from("/nowhere"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.code(), CorpusErrorCode::CreateDir);
        assert_eq!(err.code().to_string(), "CORPUS_CREATE_DIR");
    }
}
