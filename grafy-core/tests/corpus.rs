//! End-to-end corpus generation against a temporary directory.

use std::{fs, num::NonZeroUsize, path::Path};

use grafy_core::{
    Algorithm, CorpusBuilder, CorpusError, KChoice, ModeSweep, SweepConfig, TestSetSpec, Topology,
    TopologyKind, read_test_case,
};
use grafy_test_support::tracing::RecordingLayer;
use proptest::prelude::*;
use rstest::rstest;
use tempfile::TempDir;

fn spec(n1: usize, n2: usize, k: KChoice, topology: Topology, count: usize) -> TestSetSpec {
    TestSetSpec {
        n1,
        n2,
        k,
        topology,
        allow_loops: false,
        count,
        prefix: "test".to_owned(),
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("directory readable")
        .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

#[test]
fn test_set_files_parse_back_with_their_parameters() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("nested/out");
    let spec = spec(5, 3, KChoice::Random, Topology::Sparse, 4);

    let files = CorpusBuilder::seeded(Some(11))
        .write_test_set(&out, &spec)
        .expect("test set written");

    assert_eq!(files.len(), 4);
    for (offset, path) in files.iter().enumerate() {
        let case = read_test_case(path).expect("file parses");
        let name = path.file_name().and_then(|name| name.to_str()).expect("utf-8 name");
        let expected = format!(
            "test_n1_000005_n2_000003_k_{:03}_{:03}.txt",
            case.k().get(),
            offset + 1
        );
        assert_eq!(name, expected);
        assert_eq!(case.graph_a().order(), 5);
        assert_eq!(case.graph_b().order(), 3);
        assert!(case.graph_a().has_zero_diagonal());
        assert!((1..=5).contains(&case.k().get()));
    }
}

#[test]
fn degenerate_requests_are_written_literally() {
    let dir = TempDir::new().expect("temp dir");
    let k = NonZeroUsize::new(9).expect("non-zero");
    let files = CorpusBuilder::seeded(Some(1))
        .write_test_set(dir.path(), &spec(0, 0, KChoice::Fixed(k), Topology::Dense, 1))
        .expect("test set written");
    let [path] = files.as_slice() else {
        panic!("expected one file, got {files:?}");
    };
    assert_eq!(fs::read_to_string(path).expect("readable"), "0\n0\n9");
}

#[test]
fn identical_seeds_reproduce_the_sweep() {
    let config = SweepConfig {
        count: 2,
        topologies: vec![TopologyKind::Random, TopologyKind::Grid],
        exact: ModeSweep {
            n1: vec![2, 3],
            k: vec![2],
            grid_n1: vec![4],
            triples: Vec::new(),
        },
        approx: ModeSweep {
            n1: vec![6],
            k: vec![3],
            grid_n1: vec![9],
            triples: Vec::new(),
        },
    };
    let first = TempDir::new().expect("temp dir");
    let second = TempDir::new().expect("temp dir");

    let report = CorpusBuilder::seeded(Some(42))
        .write_sweep(first.path(), &config)
        .expect("sweep written");
    CorpusBuilder::seeded(Some(42))
        .write_sweep(second.path(), &config)
        .expect("sweep written");

    assert_eq!(report.batches.len(), 4);
    assert_eq!(report.file_count(), 2 * (2 + 1 + 1 + 1));
    for batch in &report.batches {
        let relative = batch.dir.strip_prefix(first.path()).expect("under root");
        assert_eq!(
            relative,
            Path::new(batch.mode.as_str()).join(batch.topology.as_str())
        );
        for path in &batch.files {
            let twin = second.path().join(path.strip_prefix(first.path()).expect("under root"));
            assert_eq!(
                fs::read(path).expect("readable"),
                fs::read(&twin).expect("twin readable")
            );
        }
    }
    assert_eq!(
        file_names(&first.path().join("exact/grid")),
        vec![
            "test_n1_000004_n2_000003_k_002_001.txt",
            "test_n1_000004_n2_000003_k_002_002.txt",
        ]
    );
}

#[test]
fn sweep_grid_cases_tile_the_larger_graph() {
    let dir = TempDir::new().expect("temp dir");
    let config = SweepConfig {
        count: 1,
        topologies: vec![TopologyKind::Grid],
        exact: ModeSweep {
            grid_n1: vec![9],
            k: vec![2],
            ..ModeSweep::default()
        },
        approx: ModeSweep::default(),
    };
    let report = CorpusBuilder::seeded(Some(3))
        .write_sweep(dir.path(), &config)
        .expect("sweep written");
    let path = report
        .batches
        .first()
        .and_then(|batch| batch.files.first())
        .expect("one file");
    let case = read_test_case(path).expect("parses");
    // A 3x3 grid has 6 right and 6 down edges.
    assert_eq!(case.graph_a().edge_count(), 12);
}

#[test]
fn sweep_enables_self_loops_only_for_the_random_topology() {
    let dir = TempDir::new().expect("temp dir");
    let config = SweepConfig {
        count: 2,
        topologies: vec![
            TopologyKind::Random,
            TopologyKind::Chain,
            TopologyKind::Clique,
            TopologyKind::Grid,
        ],
        exact: ModeSweep {
            n1: vec![20],
            k: vec![2],
            grid_n1: vec![16],
            ..ModeSweep::default()
        },
        approx: ModeSweep::default(),
    };
    let report = CorpusBuilder::seeded(Some(11))
        .write_sweep(dir.path(), &config)
        .expect("sweep written");

    let mut random_loops = 0_u64;
    for batch in &report.batches {
        if batch.mode == Algorithm::Exact {
            assert!(!batch.files.is_empty(), "{:?} batch is empty", batch.topology);
        }
        for path in &batch.files {
            let case = read_test_case(path).expect("parses");
            for graph in [case.graph_a(), case.graph_b()] {
                if batch.topology == TopologyKind::Random {
                    random_loops += (0..graph.order())
                        .filter_map(|vertex| graph.get(vertex, vertex))
                        .map(u64::from)
                        .sum::<u64>();
                } else {
                    assert!(
                        graph.has_zero_diagonal(),
                        "{} has a self-loop",
                        path.display()
                    );
                }
            }
        }
    }
    // Each diagonal entry of the random model is non-zero with probability
    // 3/4, so 78 draws without a loop cannot happen in practice.
    assert!(random_loops > 0, "random sweep batch has no self-loop");
}

#[rstest]
#[case::file_in_the_way("blocker")]
fn unwritable_directory_reports_stable_code(#[case] blocker: &str) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(blocker);
    fs::write(&path, "occupied").expect("blocker written");

    let (result, layer) = RecordingLayer::capture(|| {
        CorpusBuilder::seeded(Some(5)).write_test_set(
            &path.join("inner"),
            &spec(2, 2, KChoice::Random, Topology::Chain, 1),
        )
    });
    let err = result.expect_err("creating a directory below a file must fail");
    assert!(matches!(err, CorpusError::CreateDir { .. }));
    assert_eq!(err.code().as_str(), "CORPUS_CREATE_DIR");
    assert!(layer.span("corpus.write_test_set").is_some());
}

#[test]
fn write_test_set_records_file_count() {
    let dir = TempDir::new().expect("temp dir");
    let (result, layer) = RecordingLayer::capture(|| {
        CorpusBuilder::seeded(Some(5))
            .write_test_set(dir.path(), &spec(3, 3, KChoice::Random, Topology::MultiEdge, 3))
    });
    result.expect("test set written");
    let span = layer.span("corpus.write_test_set").expect("span recorded");
    assert_eq!(span.fields.get("files").map(String::as_str), Some("3"));
    assert!(layer.saw_event(tracing::Level::INFO, "generated test set"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn written_files_round_trip(
        seed in any::<u64>(),
        n1 in 0_usize..7,
        n2 in 0_usize..7,
        loops in any::<bool>(),
    ) {
        let dir = TempDir::new().expect("temp dir");
        let mut builder = CorpusBuilder::seeded(Some(seed));
        let mut twin = CorpusBuilder::seeded(Some(seed));
        let spec = TestSetSpec {
            allow_loops: loops,
            ..spec(n1, n2, KChoice::Random, Topology::MultiEdge, 1)
        };

        let files = builder.write_test_set(dir.path(), &spec).expect("written");
        let expected = twin.build_test_case(&spec);
        let path = files.first().expect("one file");
        prop_assert_eq!(read_test_case(path).expect("parses"), expected);
    }
}
