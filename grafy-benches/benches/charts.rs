//! SVG chart rendering benchmarks.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{Criterion, criterion_group, criterion_main};

use grafy_benches::{
    error::BenchSetupError,
    source::{SyntheticLog, SyntheticLogConfig},
};
use grafy_core::{Aggregation, parse_log_str};
use grafy_plot::LineChart;

/// Seed used for the synthetic log.
const SEED: u64 = 42;

/// Lines in the synthetic log.
const LINE_COUNT: usize = 10_000;

fn render_charts_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let log = SyntheticLog::generate(&SyntheticLogConfig {
        line_count: LINE_COUNT,
        noise_every: 0,
        seed: SEED,
    })?;
    let aggregation = Aggregation::from_records(&parse_log_str(log.text()).records);
    let scenario = aggregation
        .scenarios
        .iter()
        .max_by_key(|scenario| {
            scenario
                .series
                .iter()
                .map(|series| series.points.len())
                .sum::<usize>()
        })
        .ok_or(BenchSetupError::NoScenario)?;

    c.bench_function("render_scenario", |b| {
        b.iter(|| {
            scenario
                .series
                .iter()
                .map(|series| LineChart::for_series(scenario, series).to_string())
                .collect::<Vec<_>>()
        });
    });
    Ok(())
}

fn render_charts(c: &mut Criterion) {
    if let Err(err) = render_charts_impl(c) {
        panic!("chart benchmark setup failed: {err}");
    }
}

criterion_group!(benches, render_charts);
criterion_main!(benches);
