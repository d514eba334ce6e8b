//! Synthetic run logs for benchmarking.
//!
//! Lines follow the timing grammar the runner writes, so the parser and the
//! aggregation see realistic input. Every `noise_every`-th line is a failure
//! marker the parser must skip.

use std::time::Duration;

use grafy_core::format_elapsed;
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};

const HEADER: &str = "Execution Log - Started at 2024-01-01 00:00:00";
const DIMENSIONS: [&str; 3] = ["n1", "n2", "k"];
const ALGORITHMS: [&str; 2] = ["exact", "approx"];
const TOPOLOGIES: [&str; 4] = ["random", "chain", "clique", "grid"];
const SIZES: [usize; 5] = [10, 20, 50, 100, 200];
const REPETITIONS: usize = 10;
const MAX_ELAPSED_MS: u64 = 600_000;

/// Errors that may occur during synthetic log generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticLogError {
    /// The requested line count was zero.
    #[error("line count must be greater than zero")]
    ZeroLines,
}

/// Configuration for synthetic log generation.
#[derive(Clone, Debug)]
pub struct SyntheticLogConfig {
    /// Timing and failure lines to generate, excluding the header.
    pub line_count: usize,
    /// Period of `ERROR` lines; zero disables them.
    pub noise_every: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A generated run log.
///
/// # Examples
///
/// ```
/// use grafy_benches::source::{SyntheticLog, SyntheticLogConfig};
///
/// let config = SyntheticLogConfig { line_count: 20, noise_every: 5, seed: 42 };
/// let log = SyntheticLog::generate(&config).expect("valid config");
/// assert_eq!(log.text().lines().count(), 22);
/// ```
#[derive(Clone, Debug)]
pub struct SyntheticLog {
    text: String,
}

impl SyntheticLog {
    /// Generates the log eagerly from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyntheticLogError::ZeroLines`] if `line_count` is zero.
    pub fn generate(config: &SyntheticLogConfig) -> Result<Self, SyntheticLogError> {
        if config.line_count == 0 {
            return Err(SyntheticLogError::ZeroLines);
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut text = format!("{HEADER}\n{}\n", "-".repeat(50));
        for line in 1..=config.line_count {
            let path = random_path(&mut rng);
            let noisy = config.noise_every != 0 && line.is_multiple_of(config.noise_every);
            if noisy {
                text.push_str(&format!("{path}: ERROR\n"));
            } else {
                let elapsed = Duration::from_millis(rng.gen_range(0..MAX_ELAPSED_MS));
                text.push_str(&format!("{path}: {}\n", format_elapsed(elapsed)));
            }
        }
        Ok(Self { text })
    }

    /// The log text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

fn pick<T: Copy + Default>(rng: &mut SmallRng, values: &[T]) -> T {
    values.choose(rng).copied().unwrap_or_default()
}

fn random_path(rng: &mut SmallRng) -> String {
    let dimension = pick(rng, &DIMENSIONS);
    let algorithm = pick(rng, &ALGORITHMS);
    let topology = pick(rng, &TOPOLOGIES);
    let n1 = pick(rng, &SIZES);
    let n2 = pick(rng, &SIZES);
    let k = rng.gen_range(1..=n1.max(1));
    let index = rng.gen_range(1..=REPETITIONS);
    format!(
        "test_{dimension}_input/{algorithm}/{topology}/test_n1_{n1:03}_n2_{n2:03}_k_{k:03}_{index:03}.txt"
    )
}
