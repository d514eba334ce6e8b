//! Corpus generation: test sets of serialized [`TestCase`] files.
//!
//! A [`CorpusBuilder`] owns the single random source of a generation run, so
//! a fixed seed and a fixed sweep order reproduce the corpus byte for byte.

mod sweep;

use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{Span, debug, field, info, instrument};

use crate::{
    error::CorpusError,
    generator::generate,
    test_case::TestCase,
    topology::Topology,
};

pub use sweep::{ModeSweep, ParameterTriple, SweepBatch, SweepConfig, SweepReport};

/// How the parameter `k` is chosen for each test case of a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KChoice {
    /// Every test case uses this value.
    Fixed(NonZeroUsize),
    /// Each test case draws `k` uniformly from `[1, max(n1, n2)]`.
    Random,
}

/// Parameters of one test set: `count` independently generated test cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSetSpec {
    /// Vertex count of graph A.
    pub n1: usize,
    /// Vertex count of graph B.
    pub n2: usize,
    /// Parameter `k`.
    pub k: KChoice,
    /// Edge model applied to both graphs.
    pub topology: Topology,
    /// Whether diagonal pairs are handed to the edge model.
    pub allow_loops: bool,
    /// Number of test cases to write.
    pub count: usize,
    /// File name prefix.
    pub prefix: String,
}

/// Formats the corpus file name of one test case.
///
/// # Examples
/// ```
/// use grafy_core::test_file_name;
///
/// assert_eq!(
///     test_file_name("test", 50, 25, 10, 3),
///     "test_n1_000050_n2_000025_k_010_003.txt",
/// );
/// ```
#[must_use]
pub fn test_file_name(prefix: &str, n1: usize, n2: usize, k: usize, index: usize) -> String {
    format!("{prefix}_n1_{n1:06}_n2_{n2:06}_k_{k:03}_{index:03}.txt")
}

/// Reads a corpus file back into a [`TestCase`].
///
/// # Errors
/// Returns [`CorpusError::Read`] when the file cannot be read and
/// [`CorpusError::Malformed`] when its content is not a test case.
pub fn read_test_case(path: &Path) -> Result<TestCase, CorpusError> {
    let text = fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    text.parse().map_err(|source| CorpusError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_dir(dir: &Path) -> Result<(), CorpusError> {
    fs::create_dir_all(dir).map_err(|source| CorpusError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Generates test cases and writes them to disk.
#[derive(Debug)]
pub struct CorpusBuilder<R = SmallRng> {
    rng: R,
}

impl CorpusBuilder<SmallRng> {
    /// Creates a builder whose output is fully determined by `seed`, or
    /// seeded from the operating system when `seed` is `None`.
    #[must_use]
    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(value) => SmallRng::seed_from_u64(value),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> CorpusBuilder<R> {
    /// Creates a builder drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates one test case: graph A, then graph B, then `k` if it is
    /// random.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::{CorpusBuilder, KChoice, TestSetSpec, Topology};
    ///
    /// let spec = TestSetSpec {
    ///     n1: 4,
    ///     n2: 3,
    ///     k: KChoice::Random,
    ///     topology: Topology::Chain,
    ///     allow_loops: false,
    ///     count: 1,
    ///     prefix: "test".to_owned(),
    /// };
    /// let case = CorpusBuilder::seeded(Some(7)).build_test_case(&spec);
    /// assert_eq!(case.graph_a().edge_count(), 3);
    /// assert!((1..=4).contains(&case.k().get()));
    /// ```
    pub fn build_test_case(&mut self, spec: &TestSetSpec) -> TestCase {
        let graph_a = generate(spec.n1, &spec.topology, spec.allow_loops, &mut self.rng);
        let graph_b = generate(spec.n2, &spec.topology, spec.allow_loops, &mut self.rng);
        let k = match spec.k {
            KChoice::Fixed(k) => k,
            KChoice::Random => self.draw_k(spec.n1.max(spec.n2)),
        };
        TestCase::new(graph_a, graph_b, k)
    }

    fn draw_k(&mut self, upper: usize) -> NonZeroUsize {
        // With two empty graphs the only admissible value is 1.
        let drawn = if upper == 0 {
            1
        } else {
            self.rng.gen_range(1..=upper)
        };
        NonZeroUsize::new(drawn).unwrap_or(NonZeroUsize::MIN)
    }

    /// Writes `spec.count` test cases into `dir`, creating it if needed,
    /// and returns the written paths in index order.
    ///
    /// # Errors
    /// Returns [`CorpusError::CreateDir`] when `dir` cannot be created and
    /// [`CorpusError::Write`] when a file cannot be written. Files written
    /// before the failure are left in place.
    #[instrument(
        name = "corpus.write_test_set",
        err,
        skip(self, spec),
        fields(dir = %dir.display(), n1 = spec.n1, n2 = spec.n2, count = spec.count, files = field::Empty),
    )]
    pub fn write_test_set(
        &mut self,
        dir: &Path,
        spec: &TestSetSpec,
    ) -> Result<Vec<PathBuf>, CorpusError> {
        ensure_dir(dir)?;
        let mut files = Vec::with_capacity(spec.count);
        for index in 1..=spec.count {
            let case = self.build_test_case(spec);
            let name = test_file_name(&spec.prefix, spec.n1, spec.n2, case.k().get(), index);
            let path = dir.join(name);
            fs::write(&path, case.to_string()).map_err(|source| CorpusError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), k = case.k().get(), "wrote test case");
            files.push(path);
        }
        Span::current().record("files", files.len());
        info!(
            dir = %dir.display(),
            topology = spec.topology.kind().as_str(),
            files = files.len(),
            "generated test set"
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::mock::StepRng;
    use tempfile::TempDir;

    fn spec(k: KChoice, count: usize) -> TestSetSpec {
        TestSetSpec {
            n1: 3,
            n2: 2,
            k,
            topology: Topology::MultiEdge,
            allow_loops: false,
            count,
            prefix: "test".to_owned(),
        }
    }

    fn temp_dir() -> TempDir {
        match TempDir::new() {
            Ok(dir) => dir,
            Err(err) => panic!("failed to create temp dir: {err}"),
        }
    }

    #[test]
    fn random_k_stays_in_range() {
        let mut builder = CorpusBuilder::seeded(Some(11));
        for _ in 0..200 {
            let case = builder.build_test_case(&spec(KChoice::Random, 1));
            assert!((1..=3).contains(&case.k().get()));
        }
    }

    #[test]
    fn random_k_with_empty_graphs_is_one() {
        let mut builder = CorpusBuilder::with_rng(StepRng::new(0, 1));
        let mut empty = spec(KChoice::Random, 1);
        empty.n1 = 0;
        empty.n2 = 0;
        let case = builder.build_test_case(&empty);
        assert_eq!(case.k().get(), 1);
        assert_eq!(case.to_string(), "0\n0\n1");
    }

    #[test]
    fn samples_differ_within_a_set() {
        let mut builder = CorpusBuilder::seeded(Some(5));
        let mut large = spec(KChoice::Fixed(NonZeroUsize::MIN), 1);
        large.n1 = 12;
        let first = builder.build_test_case(&large);
        let second = builder.build_test_case(&large);
        assert_ne!(first, second);
    }

    #[test]
    fn write_test_set_names_files_by_index() {
        let dir = temp_dir();
        let target = dir.path().join("nested/out");
        let k = NonZeroUsize::new(2).expect("non-zero");
        let files = CorpusBuilder::seeded(Some(1))
            .write_test_set(&target, &spec(KChoice::Fixed(k), 3))
            .expect("writing must succeed");
        let names: Vec<String> = files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "test_n1_000003_n2_000002_k_002_001.txt",
                "test_n1_000003_n2_000002_k_002_002.txt",
                "test_n1_000003_n2_000002_k_002_003.txt",
            ]
        );
        for path in &files {
            let case = read_test_case(path).expect("written files must parse");
            assert_eq!(case.k(), k);
            assert_eq!(case.graph_a().order(), 3);
        }
    }

    #[test]
    fn write_test_set_reports_directory_failure() {
        let dir = temp_dir();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("fixture must be written");
        let err = CorpusBuilder::seeded(Some(1))
            .write_test_set(&blocker.join("child"), &spec(KChoice::Random, 1))
            .expect_err("directory creation must fail");
        assert!(matches!(err, CorpusError::CreateDir { .. }));
    }

    #[test]
    fn seeded_builders_write_identical_files() {
        let first = temp_dir();
        let second = temp_dir();
        let set = spec(KChoice::Random, 4);
        let a = CorpusBuilder::seeded(Some(9))
            .write_test_set(first.path(), &set)
            .expect("first run");
        let b = CorpusBuilder::seeded(Some(9))
            .write_test_set(second.path(), &set)
            .expect("second run");
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.file_name(), right.file_name());
            let left_bytes = fs::read(left).expect("left file");
            let right_bytes = fs::read(right).expect("right file");
            assert_eq!(left_bytes, right_bytes);
        }
    }
}
