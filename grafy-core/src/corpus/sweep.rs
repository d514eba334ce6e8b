//! Parameter sweeps across topologies and algorithm modes.
//!
//! The sweep ranges live in a TOML file so that different benchmark
//! campaigns can swap them without touching code:
//!
//! ```toml
//! count = 10
//! topologies = ["random", "chain", "clique", "grid"]
//!
//! [exact]
//! n1 = [2, 3, 4]
//! k = [2]
//! grid_n1 = [4, 9]
//!
//! [approx]
//! n1 = [100, 200]
//! k = [2]
//! triples = [{ n1 = 500, n2 = 20, k = 3 }]
//! ```

use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use rand::Rng;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{CorpusBuilder, KChoice, TestSetSpec};
use crate::{
    error::{CorpusError, SweepConfigError},
    runlog::Algorithm,
    topology::{TopologyKind, TopologyParams},
};

const DEFAULT_COUNT: usize = 10;
const SWEEP_PREFIX: &str = "test";

const fn default_count() -> usize {
    DEFAULT_COUNT
}

fn default_topologies() -> Vec<TopologyKind> {
    vec![
        TopologyKind::Random,
        TopologyKind::Chain,
        TopologyKind::Clique,
        TopologyKind::Grid,
    ]
}

/// One explicit `(n1, n2, k)` configuration.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParameterTriple {
    /// Vertex count of graph A.
    pub n1: usize,
    /// Vertex count of graph B.
    pub n2: usize,
    /// Parameter `k`.
    pub k: usize,
}

/// Sweep ranges for one algorithm mode.
///
/// Derived configurations pair every `n1` with every `k`, setting
/// `n2 = n1 - 1` and keeping only `n1 > 1` and `k <= n1`. Grid topologies
/// use `grid_n1` instead of `n1`. Explicit `triples` are appended for every
/// topology.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModeSweep {
    /// Vertex counts of graph A for non-grid topologies.
    pub n1: Vec<usize>,
    /// Values of `k`.
    pub k: Vec<usize>,
    /// Vertex counts of graph A for the grid topology.
    pub grid_n1: Vec<usize>,
    /// Configurations used verbatim.
    pub triples: Vec<ParameterTriple>,
}

impl ModeSweep {
    /// Lists the configurations generated for `kind`, derived ones first.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::{ModeSweep, ParameterTriple, TopologyKind};
    ///
    /// let sweep = ModeSweep { n1: vec![1, 2, 3], k: vec![2], ..ModeSweep::default() };
    /// assert_eq!(
    ///     sweep.triples_for(TopologyKind::Chain),
    ///     vec![
    ///         ParameterTriple { n1: 2, n2: 1, k: 2 },
    ///         ParameterTriple { n1: 3, n2: 2, k: 2 },
    ///     ],
    /// );
    /// ```
    #[must_use]
    pub fn triples_for(&self, kind: TopologyKind) -> Vec<ParameterTriple> {
        let n1_values = if kind == TopologyKind::Grid {
            &self.grid_n1
        } else {
            &self.n1
        };
        let mut triples: Vec<ParameterTriple> = n1_values
            .iter()
            .flat_map(|&n1| {
                self.k.iter().filter_map(move |&k| {
                    (n1 > 1 && k <= n1).then(|| ParameterTriple {
                        n1,
                        n2: n1.saturating_sub(1),
                        k,
                    })
                })
            })
            .collect();
        triples.extend(self.triples.iter().copied());
        triples
    }

    fn validate(&self, mode: &'static str) -> Result<(), SweepConfigError> {
        let explicit_zero = self.triples.iter().any(|triple| triple.k == 0);
        if self.k.contains(&0) || explicit_zero {
            return Err(SweepConfigError::ZeroK { mode });
        }
        Ok(())
    }
}

/// A complete sweep: topologies × modes × configurations.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Test cases written per configuration.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Topologies to generate, in order.
    #[serde(default = "default_topologies")]
    pub topologies: Vec<TopologyKind>,
    /// Ranges for the exact algorithm.
    #[serde(default)]
    pub exact: ModeSweep,
    /// Ranges for the approximate algorithm.
    #[serde(default)]
    pub approx: ModeSweep,
}

impl SweepConfig {
    /// The stock sweep: small graphs for the exact algorithm, larger ones
    /// for the approximate algorithm, perfect squares for grids.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            count: DEFAULT_COUNT,
            topologies: default_topologies(),
            exact: ModeSweep {
                n1: (1..=9).collect(),
                k: vec![2],
                grid_n1: vec![1, 4, 9],
                triples: Vec::new(),
            },
            approx: ModeSweep {
                n1: (100..=1_000).step_by(100).collect(),
                k: vec![2],
                grid_n1: (4..=10).map(|side: usize| side.saturating_mul(side)).collect(),
                triples: Vec::new(),
            },
        }
    }

    /// Parses and validates a TOML sweep description.
    ///
    /// # Errors
    /// Returns [`SweepConfigError::Parse`] for invalid TOML or unknown keys,
    /// [`SweepConfigError::ZeroCount`] for a zero sample count and
    /// [`SweepConfigError::ZeroK`] when any `k` is zero.
    pub fn from_toml_str(text: &str) -> Result<Self, SweepConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML sweep description from `path`.
    ///
    /// # Errors
    /// Returns [`SweepConfigError::Read`] when the file cannot be read, and
    /// the errors of [`Self::from_toml_str`] otherwise.
    pub fn load(path: &Path) -> Result<Self, SweepConfigError> {
        let text = fs::read_to_string(path).map_err(|source| SweepConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Ranges configured for `mode`.
    #[must_use]
    pub const fn mode(&self, mode: Algorithm) -> &ModeSweep {
        match mode {
            Algorithm::Exact => &self.exact,
            Algorithm::Approx => &self.approx,
        }
    }

    fn validate(&self) -> Result<(), SweepConfigError> {
        if self.count == 0 {
            return Err(SweepConfigError::ZeroCount);
        }
        self.exact.validate(Algorithm::Exact.as_str())?;
        self.approx.validate(Algorithm::Approx.as_str())
    }
}

/// Files written for one topology and mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepBatch {
    /// Topology family of the batch.
    pub topology: TopologyKind,
    /// Algorithm mode the batch is destined for.
    pub mode: Algorithm,
    /// Directory holding the batch.
    pub dir: PathBuf,
    /// Written files in generation order.
    pub files: Vec<PathBuf>,
}

/// Outcome of a sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// One entry per topology and mode, in generation order.
    pub batches: Vec<SweepBatch>,
}

impl SweepReport {
    /// Total number of files written.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.files.len()).sum()
    }
}

impl<R: Rng> CorpusBuilder<R> {
    /// Writes the whole sweep under `root/<mode>/<topology>/`.
    ///
    /// Topologies are generated in configuration order, exact before
    /// approximate. Clique size and grid width follow the larger graph of
    /// each configuration; only the random topology enables self-loops.
    ///
    /// # Errors
    /// Propagates the first [`CorpusError`]; files written before it remain.
    #[instrument(name = "corpus.write_sweep", err, skip(self, config), fields(root = %root.display()))]
    pub fn write_sweep(
        &mut self,
        root: &Path,
        config: &SweepConfig,
    ) -> Result<SweepReport, CorpusError> {
        let mut report = SweepReport::default();
        for &kind in &config.topologies {
            for mode in Algorithm::ALL {
                let dir = root.join(mode.as_str()).join(kind.as_str());
                let mut files = Vec::new();
                for triple in config.mode(mode).triples_for(kind) {
                    let Some(k) = NonZeroUsize::new(triple.k) else {
                        continue;
                    };
                    let spec = TestSetSpec {
                        n1: triple.n1,
                        n2: triple.n2,
                        k: KChoice::Fixed(k),
                        topology: kind.resolve(TopologyParams::default(), triple.n1.max(triple.n2)),
                        allow_loops: kind == TopologyKind::Random,
                        count: config.count,
                        prefix: SWEEP_PREFIX.to_owned(),
                    };
                    files.extend(self.write_test_set(&dir, &spec)?);
                }
                info!(
                    topology = kind.as_str(),
                    mode = mode.as_str(),
                    files = files.len(),
                    "sweep batch complete"
                );
                report.batches.push(SweepBatch {
                    topology: kind,
                    mode,
                    dir,
                    files,
                });
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn builtin_matches_stock_ranges() {
        let config = SweepConfig::builtin();
        assert_eq!(config.exact.triples_for(TopologyKind::Random).len(), 8);
        assert_eq!(config.approx.triples_for(TopologyKind::Chain).len(), 10);
        assert_eq!(
            config.exact.triples_for(TopologyKind::Grid),
            vec![
                ParameterTriple { n1: 4, n2: 3, k: 2 },
                ParameterTriple { n1: 9, n2: 8, k: 2 },
            ]
        );
        assert_eq!(config.approx.grid_n1.first(), Some(&16));
        assert_eq!(config.approx.grid_n1.last(), Some(&100));
    }

    #[test]
    fn parses_toml_with_defaults() {
        let config = SweepConfig::from_toml_str(
            r#"
            topologies = ["default", "grid"]

            [exact]
            n1 = [3]
            k = [1, 2, 5]
            triples = [{ n1 = 7, n2 = 7, k = 3 }]
            "#,
        )
        .expect("config must parse");
        assert_eq!(config.count, 10);
        assert_eq!(config.topologies, vec![TopologyKind::Random, TopologyKind::Grid]);
        assert_eq!(
            config.exact.triples_for(TopologyKind::Random),
            vec![
                ParameterTriple { n1: 3, n2: 2, k: 1 },
                ParameterTriple { n1: 3, n2: 2, k: 2 },
                ParameterTriple { n1: 7, n2: 7, k: 3 },
            ]
        );
        assert!(config.approx.triples_for(TopologyKind::Random).is_empty());
    }

    #[rstest]
    #[case::zero_count("count = 0")]
    #[case::zero_k("[exact]\nk = [0]")]
    #[case::zero_triple_k("[approx]\ntriples = [{ n1 = 2, n2 = 1, k = 0 }]")]
    #[case::unknown_key("colour = \"blue\"")]
    #[case::unknown_topology("topologies = [\"torus\"]")]
    fn rejects_invalid_configs(#[case] text: &str) {
        assert!(SweepConfig::from_toml_str(text).is_err());
    }
}
