//! Command results and their plain-text rendering.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use grafy_core::{ParameterMean, SweepReport};

use crate::runner::RunReport;

const RULE_WIDTH: usize = 66;

/// Result of the `report` command.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSummary {
    /// Log that was aggregated.
    pub log_path: PathBuf,
    /// Timing lines recognised in the log.
    pub records: usize,
    /// Lines that did not match the timing grammar.
    pub skipped_lines: usize,
    /// Mean per distinct parameter combination.
    pub means: Vec<ParameterMean>,
    /// Chart directory, when charts were attempted.
    pub fig_dir: Option<PathBuf>,
    /// Charts written.
    pub charts: Vec<PathBuf>,
    /// Why charting stopped, when it failed.
    pub chart_error: Option<String>,
}

/// Summary of a successful CLI command.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionSummary {
    /// Files written by `generate`.
    Generate {
        /// Output directory.
        dir: PathBuf,
        /// Test case files in write order.
        files: Vec<PathBuf>,
    },
    /// Batches written by `sweep`.
    Sweep(SweepReport),
    /// Outcomes of `run`.
    Run(RunReport),
    /// Aggregation produced by `report`.
    Report(ReportSummary),
}

/// Writes a human-readable rendering of `summary` to `writer`.
///
/// # Errors
/// Returns any error raised by `writer`.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Generate { dir, files } => {
            writeln!(
                writer,
                "generated {} test cases in {}",
                files.len(),
                dir.display()
            )?;
        }
        ExecutionSummary::Sweep(report) => {
            for batch in &report.batches {
                writeln!(
                    writer,
                    "{}/{}: {} files",
                    batch.mode.as_str(),
                    batch.topology.as_str(),
                    batch.files.len()
                )?;
            }
            writeln!(writer, "total: {} files", report.file_count())?;
        }
        ExecutionSummary::Run(report) => {
            writeln!(writer, "completed: {}", report.completed())?;
            writeln!(writer, "failed: {}", report.failed())?;
            writeln!(writer, "timed out: {}", report.timed_out())?;
            writeln!(writer, "log: {}", report.log_path.display())?;
        }
        ExecutionSummary::Report(report) => render_report(report, &mut writer)?,
    }
    Ok(())
}

fn render_report(report: &ReportSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "records: {} (skipped lines: {})",
        report.records, report.skipped_lines
    )?;
    if report.means.is_empty() {
        writeln!(writer, "no data")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<8} {:<8} {:<8} {:<8} {:<6} {:<8} {:<15}",
        "dim", "algo", "n1", "n2", "k", "count", "avg time (ms)"
    )?;
    writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
    for mean in &report.means {
        writeln!(
            writer,
            "{:<8} {:<8} {:<8} {:<8} {:<6} {:<8} {:<15.3}",
            mean.dimension.as_str(),
            mean.algorithm.as_str(),
            mean.n1,
            mean.n2,
            mean.k,
            mean.sample_count,
            mean.mean_ms
        )?;
    }

    match (&report.fig_dir, &report.chart_error) {
        (_, Some(err)) => writeln!(writer, "charts: failed: {err}")?,
        (Some(dir), None) => writeln!(
            writer,
            "charts: {} written to {}",
            report.charts.len(),
            dir.display()
        )?,
        (None, None) => {}
    }
    Ok(())
}
