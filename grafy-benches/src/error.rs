//! Benchmark setup error type.

use crate::source::SyntheticLogError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic log generation failed.
    #[error("synthetic log generation failed: {0}")]
    Synthetic(#[from] SyntheticLogError),
    /// The synthetic log produced nothing to chart.
    #[error("synthetic log yielded no chartable scenario")]
    NoScenario,
}
