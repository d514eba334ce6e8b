//! Grafy core library.
//!
//! Generates reproducible directed-multigraph test corpora for the external
//! graph-comparison program and turns the timing logs it produces into
//! aggregated benchmark series.
//!
//! The pipeline reads leaves first:
//!
//! - [`Topology`] decides the edge multiplicity of each ordered vertex pair;
//! - [`generate`] fills an [`AdjacencyMatrix`] from a topology;
//! - [`CorpusBuilder`] writes [`TestCase`] files, singly or as a sweep;
//! - [`parse_log_str`] extracts [`LogRecord`]s from a run log;
//! - [`Aggregation`] averages the records and groups them into scenarios.

mod aggregate;
mod corpus;
mod error;
mod generator;
mod matrix;
mod runlog;
mod test_case;
mod topology;

pub use crate::{
    aggregate::{AggregatedPoint, Aggregation, FixedParameters, ParameterMean, Scenario, Series},
    corpus::{
        CorpusBuilder, KChoice, ModeSweep, ParameterTriple, SweepBatch, SweepConfig, SweepReport,
        TestSetSpec, read_test_case, test_file_name,
    },
    error::{
        CorpusError, CorpusErrorCode, MatrixError, RunLogError, SweepConfigError,
        TestCaseParseError,
    },
    generator::generate,
    matrix::{AdjacencyMatrix, Multiplicity},
    runlog::{
        Algorithm, ExperimentDimension, LineRejection, LogRecord, ParsedLog, format_elapsed,
        parse_elapsed_ms, parse_line, parse_log_file, parse_log_str,
    },
    test_case::TestCase,
    topology::{EdgeModel, Topology, TopologyKind, TopologyParams},
};
