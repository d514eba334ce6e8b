//! Run-log parsing and aggregation benchmarks.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use grafy_benches::{
    error::BenchSetupError,
    params::LogBenchParams,
    source::{SyntheticLog, SyntheticLogConfig},
};
use grafy_core::{Aggregation, parse_log_str};

/// Seed used for all synthetic logs in this benchmark.
const SEED: u64 = 42;

/// Log sizes to benchmark.
const LINE_COUNTS: &[usize] = &[1_000, 10_000, 100_000];

/// One failure marker per this many lines.
const NOISE_EVERY: usize = 50;

fn runlog_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("runlog");
    group.sample_size(20);

    for &line_count in LINE_COUNTS {
        let log = SyntheticLog::generate(&SyntheticLogConfig {
            line_count,
            noise_every: NOISE_EVERY,
            seed: SEED,
        })?;
        let params = LogBenchParams { line_count };

        group.bench_with_input(
            BenchmarkId::new("parse", params),
            log.text(),
            |b, text| b.iter(|| parse_log_str(text)),
        );

        let records = parse_log_str(log.text()).records;
        group.bench_with_input(
            BenchmarkId::new("aggregate", params),
            &records,
            |b, records| b.iter(|| Aggregation::from_records(records)),
        );
    }

    group.finish();
    Ok(())
}

fn runlog(c: &mut Criterion) {
    if let Err(err) = runlog_impl(c) {
        panic!("runlog benchmark setup failed: {err}");
    }
}

criterion_group!(benches, runlog);
criterion_main!(benches);
