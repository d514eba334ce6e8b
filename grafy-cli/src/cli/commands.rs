//! Command implementations and argument parsing for the grafy CLI.

use std::{
    io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use grafy_core::{
    Aggregation, Algorithm, CorpusBuilder, CorpusError, CorpusErrorCode, KChoice, RunLogError,
    SweepConfig, SweepConfigError, TestSetSpec, TopologyKind, TopologyParams, parse_log_file,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use super::summary::{ExecutionSummary, ReportSummary};
use crate::runner::{
    ContainerLauncher, ContainerSession, ContainerSpec, DirectLauncher, RunConfig, RunnerError,
    run_corpus,
};

const DEFAULT_COUNT: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 900;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "grafy",
    about = "Generate graph-comparison test corpora, run them and report timings."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Write one test set of random graph pairs.
    Generate(GenerateCommand),
    /// Write the benchmark corpus for every topology and algorithm mode.
    Sweep(SweepCommand),
    /// Run the comparison program over a corpus and log timings.
    Run(RunCommand),
    /// Aggregate a timing log and chart it.
    Report(ReportCommand),
}

/// Topology presets accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopologyArg {
    /// Uniform multi-edge model with 0 to 3 parallel edges per pair.
    #[value(alias = "random")]
    Default,
    /// Most pairs connected, with one or two parallel edges.
    Dense,
    /// Few single edges.
    Sparse,
    /// Directed path.
    Chain,
    /// Complete digraph on the leading vertices.
    Clique,
    /// Right and down neighbours on a grid.
    Grid,
}

impl From<TopologyArg> for TopologyKind {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Default => Self::Random,
            TopologyArg::Dense => Self::Dense,
            TopologyArg::Sparse => Self::Sparse,
            TopologyArg::Chain => Self::Chain,
            TopologyArg::Clique => Self::Clique,
            TopologyArg::Grid => Self::Grid,
        }
    }
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Vertex count of the first graph.
    #[arg(long, default_value_t = 4)]
    pub n1: usize,

    /// Vertex count of the second graph.
    #[arg(long, default_value_t = 3)]
    pub n2: usize,

    /// Parameter k, or `random` to draw it per test case from [1, max(n1, n2)].
    #[arg(long, default_value = "random", value_parser = parse_k)]
    pub k: KChoice,

    /// Graph topology preset.
    #[arg(long = "type", value_enum, default_value_t = TopologyArg::Default)]
    pub topology: TopologyArg,

    /// Clique size for `--type clique`; defaults to n1.
    #[arg(long)]
    pub clique_size: Option<usize>,

    /// Grid width for `--type grid`; defaults to the integer square root of n1.
    #[arg(long)]
    pub grid_width: Option<usize>,

    /// Allow self-loops.
    #[arg(long)]
    pub loops: bool,

    /// Number of test cases to write.
    #[arg(long, short = 'c', default_value_t = DEFAULT_COUNT)]
    pub count: usize,

    /// File name prefix.
    #[arg(long, short = 'p', default_value = "test")]
    pub prefix: String,

    /// Output directory.
    #[arg(long, short = 'd', default_value = "input")]
    pub output_dir: PathBuf,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Topology selection of the `sweep` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepType {
    /// Every topology listed by the sweep configuration.
    All,
    /// Uniform multi-edge model.
    Random,
    /// Dense model.
    Dense,
    /// Sparse model.
    Sparse,
    /// Directed path.
    Chain,
    /// Complete digraph.
    Clique,
    /// Grid.
    Grid,
}

impl SweepType {
    const fn kind(self) -> Option<TopologyKind> {
        match self {
            Self::All => None,
            Self::Random => Some(TopologyKind::Random),
            Self::Dense => Some(TopologyKind::Dense),
            Self::Sparse => Some(TopologyKind::Sparse),
            Self::Chain => Some(TopologyKind::Chain),
            Self::Clique => Some(TopologyKind::Clique),
            Self::Grid => Some(TopologyKind::Grid),
        }
    }
}

/// Options accepted by the `sweep` command.
#[derive(Debug, Args, Clone)]
pub struct SweepCommand {
    /// TOML sweep description; the built-in ranges are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Topologies to generate.
    #[arg(long, value_enum, num_args = 1.., default_values_t = [SweepType::All])]
    pub types: Vec<SweepType>,

    /// Test cases per configuration, overriding the sweep description.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,

    /// Corpus root; files land in `<root>/<mode>/<topology>/`.
    #[arg(long, default_value = "input")]
    pub root: PathBuf,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Algorithm selection of the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Both algorithms.
    Both,
    /// Exact algorithm only.
    Exact,
    /// Approximate algorithm only.
    Approx,
}

impl ModeArg {
    const fn algorithm(self) -> Option<Algorithm> {
        match self {
            Self::Both => None,
            Self::Exact => Some(Algorithm::Exact),
            Self::Approx => Some(Algorithm::Approx),
        }
    }
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Corpus root walked for `.txt` test files.
    #[arg(long, default_value = "complexity_tests")]
    pub input_root: PathBuf,

    /// Root receiving program output, mirroring the corpus layout.
    #[arg(long, default_value = "complexity_tests_results")]
    pub output_root: PathBuf,

    /// Timing log to write.
    #[arg(long, default_value = "execution_times.log")]
    pub log: PathBuf,

    /// Comparison program executed on the host.
    #[arg(long, required_unless_present = "docker")]
    pub program: Option<PathBuf>,

    /// Extra argument placed before the per-case arguments; repeatable.
    #[arg(long = "program-arg", allow_hyphen_values = true)]
    pub program_args: Vec<String>,

    /// Per-case timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Algorithms to run.
    #[arg(long, value_enum, default_value_t = ModeArg::Both)]
    pub mode: ModeArg,

    /// Only run files below directories with these names, e.g. `grid`.
    #[arg(long, num_args = 1..)]
    pub types: Vec<String>,

    /// Run the program inside a container instead of on the host.
    #[arg(long)]
    pub docker: bool,

    /// Container runtime executable.
    #[arg(long, default_value = "docker")]
    pub runtime: PathBuf,

    /// Image providing the comparison program.
    #[arg(long, default_value = "grafy-taio:latest")]
    pub image: String,

    /// Container name.
    #[arg(long, default_value = "taio-test-runner")]
    pub container_name: String,

    /// Command executed inside the container for each case.
    #[arg(
        long = "container-command",
        num_args = 1..,
        allow_hyphen_values = true,
        default_values_t = ["dotnet".to_owned(), "Grafy TAiO.dll".to_owned()],
    )]
    pub container_command: Vec<String>,
}

/// Options accepted by the `report` command.
#[derive(Debug, Args, Clone)]
pub struct ReportCommand {
    /// Timing log to aggregate.
    #[arg(long, default_value = "execution_times.log")]
    pub log: PathBuf,

    /// Directory receiving the SVG charts.
    #[arg(long, default_value = "fig")]
    pub fig_dir: PathBuf,

    /// Skip chart generation.
    #[arg(long)]
    pub no_plots: bool,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A host path could not be resolved.
    #[error("failed to resolve `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// `run` was asked to execute on the host without `--program`.
    #[error("`--program` is required unless `--docker` is set")]
    MissingProgram,
    /// Corpus generation failed.
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    /// The sweep description was unusable.
    #[error(transparent)]
    SweepConfig(#[from] SweepConfigError),
    /// The timing log could not be read.
    #[error(transparent)]
    RunLog(#[from] RunLogError),
    /// The corpus run was aborted.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl CliError {
    /// Stable code of the underlying corpus failure, when there is one.
    #[must_use]
    pub fn code(&self) -> Option<CorpusErrorCode> {
        match self {
            Self::Corpus(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// Parses `--k`: a positive integer or `random`.
fn parse_k(raw: &str) -> Result<KChoice, String> {
    if raw.eq_ignore_ascii_case("random") {
        return Ok(KChoice::Random);
    }
    raw.parse::<NonZeroUsize>()
        .map(KChoice::Fixed)
        .map_err(|err| format!("expected a positive integer or `random`: {err}"))
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the command fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use grafy_cli::cli::{Cli, ExecutionSummary, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let out = dir.path().to_str().ok_or("non UTF-8 temp dir")?;
/// let cli = Cli::try_parse_from([
///     "grafy", "generate", "--n1", "3", "--n2", "2", "--count", "2", "--seed", "1",
///     "--output-dir", out,
/// ])?;
/// let ExecutionSummary::Generate { files, .. } = run_cli(cli)? else {
///     unreachable!("generate yields a generate summary");
/// };
/// assert_eq!(files.len(), 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Generate(command) => {
            span.record("command", "generate");
            generate_command(&command)
        }
        Command::Sweep(command) => {
            span.record("command", "sweep");
            sweep_command(&command)
        }
        Command::Run(command) => {
            span.record("command", "run");
            run_command(&command)
        }
        Command::Report(command) => {
            span.record("command", "report");
            Ok(report_command(&command)?)
        }
    }
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(n1 = command.n1, n2 = command.n2, topology = field::Empty, seed = ?command.seed),
)]
pub(super) fn generate_command(command: &GenerateCommand) -> Result<ExecutionSummary, CliError> {
    let kind = TopologyKind::from(command.topology);
    Span::current().record("topology", kind.as_str());
    let params = TopologyParams {
        clique_size: command.clique_size,
        grid_width: command.grid_width,
    };
    let spec = TestSetSpec {
        n1: command.n1,
        n2: command.n2,
        k: command.k,
        topology: kind.resolve(params, command.n1),
        allow_loops: command.loops,
        count: command.count,
        prefix: command.prefix.clone(),
    };
    let files = CorpusBuilder::seeded(command.seed).write_test_set(&command.output_dir, &spec)?;
    info!(files = files.len(), "command completed");
    Ok(ExecutionSummary::Generate {
        dir: command.output_dir.clone(),
        files,
    })
}

#[instrument(
    name = "cli.sweep",
    err,
    skip(command),
    fields(root = %command.root.display(), config = field::Empty, seed = ?command.seed),
)]
pub(super) fn sweep_command(command: &SweepCommand) -> Result<ExecutionSummary, CliError> {
    let mut config = match &command.config {
        Some(path) => {
            Span::current().record("config", field::display(path.display()));
            SweepConfig::load(path)?
        }
        None => {
            Span::current().record("config", "<builtin>");
            SweepConfig::builtin()
        }
    };
    apply_sweep_overrides(&mut config, command);
    let report = CorpusBuilder::seeded(command.seed).write_sweep(&command.root, &config)?;
    info!(files = report.file_count(), "command completed");
    Ok(ExecutionSummary::Sweep(report))
}

/// Narrows the configured topologies to `--types` and applies `--count`.
pub(super) fn apply_sweep_overrides(config: &mut SweepConfig, command: &SweepCommand) {
    if !command.types.contains(&SweepType::All) {
        let mut kinds: Vec<TopologyKind> = Vec::new();
        for kind in command.types.iter().filter_map(|kind| kind.kind()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        config.topologies = kinds;
    }
    if let Some(count) = command.count.and_then(|count| usize::try_from(count).ok()) {
        config.count = count;
    }
}

#[instrument(
    name = "cli.run_corpus",
    err,
    skip(command),
    fields(input_root = %command.input_root.display(), docker = command.docker),
)]
pub(super) fn run_command(command: &RunCommand) -> Result<ExecutionSummary, CliError> {
    let config = RunConfig {
        input_root: command.input_root.clone(),
        output_root: command.output_root.clone(),
        log_path: command.log.clone(),
        timeout: Duration::from_secs(command.timeout_secs),
        mode: command.mode.algorithm(),
        types: command.types.clone(),
    };

    let report = if command.docker {
        let spec = ContainerSpec {
            runtime: command.runtime.clone(),
            runtime_args: Vec::new(),
            name: command.container_name.clone(),
            image: command.image.clone(),
            input_root: absolute(&command.input_root)?,
            output_root: absolute(&command.output_root)?,
        };
        // Mounting requires the output root to exist.
        std::fs::create_dir_all(&spec.output_root).map_err(|source| RunnerError::CreateDir {
            path: spec.output_root.clone(),
            source,
        })?;
        let session = ContainerSession::start(&spec)?;
        let launcher = ContainerLauncher::new(&session, command.container_command.clone());
        let report = run_corpus(&config, &launcher)?;
        session.stop()?;
        report
    } else {
        let Some(program) = &command.program else {
            return Err(CliError::MissingProgram);
        };
        let launcher = DirectLauncher {
            program: program.clone(),
            args: command.program_args.clone(),
        };
        run_corpus(&config, &launcher)?
    };
    Ok(ExecutionSummary::Run(report))
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    std::path::absolute(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(
    name = "cli.report",
    err,
    skip(command),
    fields(log = %command.log.display(), records = field::Empty),
)]
pub(super) fn report_command(command: &ReportCommand) -> Result<ExecutionSummary, RunLogError> {
    let parsed = parse_log_file(&command.log)?;
    Span::current().record("records", parsed.records.len());
    let aggregation = Aggregation::from_records(&parsed.records);

    let mut summary = ReportSummary {
        log_path: command.log.clone(),
        records: parsed.records.len(),
        skipped_lines: parsed.skipped_lines,
        means: aggregation.means.clone(),
        fig_dir: None,
        charts: Vec::new(),
        chart_error: None,
    };
    if !command.no_plots && !aggregation.is_empty() {
        summary.fig_dir = Some(command.fig_dir.clone());
        match grafy_plot::emit_all(&aggregation, &command.fig_dir) {
            Ok(charts) => summary.charts = charts,
            Err(err) => {
                warn!(error = %err, "chart generation failed; aggregated results are unaffected");
                summary.chart_error = Some(err.to_string());
            }
        }
    }
    info!(means = summary.means.len(), charts = summary.charts.len(), "command completed");
    Ok(ExecutionSummary::Report(summary))
}
