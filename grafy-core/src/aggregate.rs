//! Averaging timing records and grouping them into chartable scenarios.
//!
//! Records are first averaged per `(dimension, algorithm, n1, n2, k)`. Each
//! mean is then placed in the scenario formed by the two parameters its
//! dimension does not vary, and in the series of its algorithm.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use tracing::{debug, warn};

use crate::runlog::{Algorithm, ExperimentDimension, LogRecord};

/// Mean timing of one distinct parameter combination.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterMean {
    /// Experiment the records came from.
    pub dimension: ExperimentDimension,
    /// Timed algorithm.
    pub algorithm: Algorithm,
    /// Vertex count of graph A.
    pub n1: usize,
    /// Vertex count of graph B.
    pub n2: usize,
    /// Parameter `k`.
    pub k: usize,
    /// Arithmetic mean of the elapsed milliseconds.
    pub mean_ms: f64,
    /// Number of records averaged.
    pub sample_count: usize,
}

/// The two parameters held constant within a scenario, in `n1, n2, k` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedParameters {
    /// Parameter names.
    pub names: [&'static str; 2],
    /// Parameter values, matching `names`.
    pub values: [usize; 2],
}

impl FixedParameters {
    /// Iterates over `(name, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.names.iter().copied().zip(self.values.iter().copied())
    }

    /// File-name friendly rendering, e.g. `n1-50_n2-25`.
    #[must_use]
    pub fn file_fragment(&self) -> String {
        self.pairs()
            .map(|(name, value)| format!("{name}-{value}"))
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for FixedParameters {
    /// Renders `n1=50, n2=25`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.pairs().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// One chart point.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedPoint {
    /// Varied dimension.
    pub dimension: ExperimentDimension,
    /// Timed algorithm.
    pub algorithm: Algorithm,
    /// Parameters held constant.
    pub fixed: FixedParameters,
    /// Value of the varied dimension.
    pub x: usize,
    /// Mean elapsed milliseconds.
    pub mean_ms: f64,
    /// Number of records behind the mean.
    pub sample_count: usize,
}

/// Points of one algorithm within a scenario, sorted by `x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// Timed algorithm.
    pub algorithm: Algorithm,
    /// Points in ascending `x` order.
    pub points: Vec<AggregatedPoint>,
}

/// One fixed-parameter combination of one experiment dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Varied dimension.
    pub dimension: ExperimentDimension,
    /// Parameters held constant.
    pub fixed: FixedParameters,
    /// One series per algorithm observed, exact first.
    pub series: Vec<Series>,
}

/// Aggregated view of a run log.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregation {
    /// Means per distinct parameter combination, in key order.
    pub means: Vec<ParameterMean>,
    /// Chartable scenarios, ordered by dimension and fixed values.
    pub scenarios: Vec<Scenario>,
}

type GroupKey = (ExperimentDimension, Algorithm, usize, usize, usize);
type ScenarioKey = (ExperimentDimension, FixedParameters);

impl Aggregation {
    /// Aggregates `records`, ignoring those without an elapsed time.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::{Aggregation, parse_log_str};
    ///
    /// let log = parse_log_str(
    ///     "test_k_input/exact/random/test_n1_050_n2_025_k_010_001.txt: 0:00:00:080\n\
    ///      test_k_input/exact/random/test_n1_050_n2_025_k_010_002.txt: 0:00:00:090",
    /// );
    /// let aggregation = Aggregation::from_records(&log.records);
    /// assert_eq!(aggregation.means.len(), 1);
    /// assert_eq!(aggregation.means[0].sample_count, 2);
    /// assert!((aggregation.means[0].mean_ms - 85.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn from_records(records: &[LogRecord]) -> Self {
        let means = group_means(records);
        let scenarios = group_scenarios(&means);
        Self { means, scenarios }
    }

    /// Returns `true` when no record carried a usable time.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Iterates over every chartable point.
    pub fn points(&self) -> impl Iterator<Item = &AggregatedPoint> {
        self.scenarios
            .iter()
            .flat_map(|scenario| scenario.series.iter())
            .flat_map(|series| series.points.iter())
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond sums and sample counts stay far below 2^52"
)]
#[expect(clippy::float_arithmetic, reason = "computing a mean requires division")]
fn group_means(records: &[LogRecord]) -> Vec<ParameterMean> {
    let mut groups: BTreeMap<GroupKey, (u128, usize)> = BTreeMap::new();
    let mut dropped = 0_usize;
    for record in records {
        let Some(elapsed) = record.elapsed_ms else {
            dropped = dropped.saturating_add(1);
            continue;
        };
        let key = (
            record.dimension.clone(),
            record.algorithm,
            record.n1,
            record.n2,
            record.k,
        );
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(u128::from(elapsed));
        entry.1 = entry.1.saturating_add(1);
    }
    if dropped > 0 {
        debug!(dropped, "records without elapsed time left out of aggregation");
    }

    groups
        .into_iter()
        .map(|((dimension, algorithm, n1, n2, k), (sum, count))| ParameterMean {
            dimension,
            algorithm,
            n1,
            n2,
            k,
            mean_ms: sum as f64 / count as f64,
            sample_count: count,
        })
        .collect()
}

/// Splits a parameter combination into the varied value and the fixed pair.
fn split_parameters(
    dimension: &ExperimentDimension,
    n1: usize,
    n2: usize,
    k: usize,
) -> Option<(usize, FixedParameters)> {
    let (x, names, values) = match dimension {
        ExperimentDimension::N1 => (n1, ["n2", "k"], [n2, k]),
        ExperimentDimension::N2 => (n2, ["n1", "k"], [n1, k]),
        ExperimentDimension::K => (k, ["n1", "n2"], [n1, n2]),
        ExperimentDimension::Other(_) => return None,
    };
    Some((x, FixedParameters { names, values }))
}

fn group_scenarios(means: &[ParameterMean]) -> Vec<Scenario> {
    let mut scenarios: BTreeMap<ScenarioKey, BTreeMap<Algorithm, Vec<AggregatedPoint>>> =
        BTreeMap::new();
    let mut uncharted: BTreeSet<&str> = BTreeSet::new();

    for mean in means {
        let Some((x, fixed)) = split_parameters(&mean.dimension, mean.n1, mean.n2, mean.k) else {
            uncharted.insert(mean.dimension.as_str());
            continue;
        };
        scenarios
            .entry((mean.dimension.clone(), fixed))
            .or_default()
            .entry(mean.algorithm)
            .or_default()
            .push(AggregatedPoint {
                dimension: mean.dimension.clone(),
                algorithm: mean.algorithm,
                fixed,
                x,
                mean_ms: mean.mean_ms,
                sample_count: mean.sample_count,
            });
    }
    for label in uncharted {
        warn!(dimension = label, "experiment dimension is not n1, n2 or k; not charted");
    }

    scenarios
        .into_iter()
        .map(|((dimension, fixed), by_algorithm)| Scenario {
            dimension,
            fixed,
            series: by_algorithm
                .into_iter()
                .map(|(algorithm, mut points)| {
                    points.sort_by_key(|point| point.x);
                    Series { algorithm, points }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn record(
        dimension: ExperimentDimension,
        algorithm: Algorithm,
        (n1, n2, k): (usize, usize, usize),
        elapsed_ms: Option<u64>,
    ) -> LogRecord {
        LogRecord {
            dimension,
            algorithm,
            n1,
            n2,
            k,
            elapsed_ms,
        }
    }

    #[test]
    fn identical_keys_are_averaged() {
        let records = vec![
            record(ExperimentDimension::K, Algorithm::Exact, (50, 25, 10), Some(80)),
            record(ExperimentDimension::K, Algorithm::Exact, (50, 25, 10), Some(90)),
        ];
        let aggregation = Aggregation::from_records(&records);
        let [mean] = aggregation.means.as_slice() else {
            panic!("expected exactly one mean, got {:?}", aggregation.means);
        };
        assert!((mean.mean_ms - 85.0).abs() < f64::EPSILON);
        assert_eq!(mean.sample_count, 2);
    }

    #[test]
    fn records_without_time_are_dropped() {
        let records = vec![
            record(ExperimentDimension::K, Algorithm::Exact, (5, 4, 2), None),
            record(ExperimentDimension::K, Algorithm::Exact, (5, 4, 2), Some(30)),
            record(ExperimentDimension::K, Algorithm::Exact, (5, 4, 3), None),
        ];
        let aggregation = Aggregation::from_records(&records);
        assert_eq!(aggregation.means.len(), 1);
        assert_eq!(aggregation.means.first().map(|mean| mean.sample_count), Some(1));
    }

    #[test]
    fn k_scenario_keeps_vertex_counts_fixed() {
        let mut records = Vec::new();
        for k in [15, 5, 10] {
            records.push(record(ExperimentDimension::K, Algorithm::Exact, (50, 25, k), Some(100)));
            records.push(record(ExperimentDimension::K, Algorithm::Approx, (50, 25, k), Some(40)));
        }
        records.push(record(ExperimentDimension::K, Algorithm::Exact, (60, 25, 5), Some(120)));

        let aggregation = Aggregation::from_records(&records);
        assert_eq!(aggregation.scenarios.len(), 2);
        let scenario = aggregation
            .scenarios
            .iter()
            .find(|scenario| scenario.fixed.values == [50, 25])
            .expect("scenario n1=50, n2=25 must exist");
        assert_eq!(scenario.fixed.to_string(), "n1=50, n2=25");
        assert_eq!(scenario.series.len(), 2);
        for series in &scenario.series {
            let xs: Vec<usize> = series.points.iter().map(|point| point.x).collect();
            assert_eq!(xs, vec![5, 10, 15]);
            assert!(series.points.iter().all(|point| point.fixed == scenario.fixed));
        }
        let algorithms: Vec<Algorithm> = scenario.series.iter().map(|series| series.algorithm).collect();
        assert_eq!(algorithms, vec![Algorithm::Exact, Algorithm::Approx]);
    }

    #[rstest]
    #[case::n1(ExperimentDimension::N1, 7, "n2-3_k-2")]
    #[case::n2(ExperimentDimension::N2, 3, "n1-7_k-2")]
    #[case::k(ExperimentDimension::K, 2, "n1-7_n2-3")]
    fn dimensions_select_their_varying_value(
        #[case] dimension: ExperimentDimension,
        #[case] expected_x: usize,
        #[case] expected_fragment: &str,
    ) {
        let (x, fixed) = split_parameters(&dimension, 7, 3, 2).expect("charted dimension");
        assert_eq!(x, expected_x);
        assert_eq!(fixed.file_fragment(), expected_fragment);
    }

    #[test]
    fn other_dimensions_are_averaged_but_not_charted() {
        let records = vec![record(
            ExperimentDimension::Other("density".to_owned()),
            Algorithm::Exact,
            (5, 4, 2),
            Some(10),
        )];
        let aggregation = Aggregation::from_records(&records);
        assert_eq!(aggregation.means.len(), 1);
        assert!(aggregation.scenarios.is_empty());
        assert_eq!(aggregation.points().count(), 0);
    }
}
