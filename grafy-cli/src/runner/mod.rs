//! Batch execution of the comparison program over a corpus.
//!
//! Every `.txt` file below the corpus root is handed to the program once, in
//! sorted path order. The wall time of each run is appended to a log in the
//! `<relative/path>: H:MM:SS:mmm` form that [`grafy_core::parse_log_str`]
//! reads back; failed runs are logged as `ERROR` and runs exceeding the
//! timeout as `TIMEOUT`.

mod container;

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use grafy_core::{Algorithm, format_elapsed};
use thiserror::Error;
use tracing::{Span, debug, field, info, instrument, warn};
use walkdir::WalkDir;

pub use container::{CONTAINER_INPUT, CONTAINER_OUTPUT, ContainerSession, ContainerSpec};

const APPROX_FLAG: &str = "-a";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors that abort a run. Failures of individual test cases are logged
/// instead.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A corpus directory could not be listed.
    #[error("failed to read corpus directory {path}: {source}")]
    ReadDir {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// An output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The run log could not be created or appended to.
    #[error("failed to write run log {path}: {source}")]
    Log {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The container runtime could not be executed.
    #[error("failed to execute container runtime {runtime}: {source}")]
    RuntimeLaunch {
        /// Runtime executable.
        runtime: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The container runtime rejected a request.
    #[error("failed to {action} container `{name}`: {stderr}")]
    Container {
        /// Attempted action, `start` or `stop`.
        action: &'static str,
        /// Container name.
        name: String,
        /// Runtime diagnostics.
        stderr: String,
    },
}

/// Paths of one test case as seen by a [`Launch`] implementation.
#[derive(Clone, Copy, Debug)]
pub struct CaseFiles<'a> {
    /// Path relative to the corpus root, `/`-separated.
    pub relative: &'a str,
    /// Host path of the test file.
    pub input: &'a Path,
    /// Host path the program should write its answer to.
    pub output: &'a Path,
    /// Algorithm selected by the file's location.
    pub algorithm: Algorithm,
}

/// Builds the process that handles one test case.
pub trait Launch {
    /// Command to run for `case`; standard streams are configured by the
    /// runner.
    fn command(&self, case: &CaseFiles<'_>) -> Command;
}

/// Runs the program on the host: `<program> [args..] [-a] <input> <output>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectLauncher {
    /// Executable.
    pub program: PathBuf,
    /// Arguments placed before the per-case arguments.
    pub args: Vec<String>,
}

impl Launch for DirectLauncher {
    fn command(&self, case: &CaseFiles<'_>) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if case.algorithm == Algorithm::Approx {
            command.arg(APPROX_FLAG);
        }
        command.arg(case.input).arg(case.output);
        command
    }
}

/// Runs the program inside a [`ContainerSession`], addressing files through
/// the container mounts.
#[derive(Debug)]
pub struct ContainerLauncher<'s> {
    session: &'s ContainerSession,
    program: Vec<String>,
}

impl<'s> ContainerLauncher<'s> {
    /// Launcher executing `program` in `session`.
    #[must_use]
    pub const fn new(session: &'s ContainerSession, program: Vec<String>) -> Self {
        Self { session, program }
    }
}

impl Launch for ContainerLauncher<'_> {
    fn command(&self, case: &CaseFiles<'_>) -> Command {
        let mut command = self.session.exec(&self.program);
        if case.algorithm == Algorithm::Approx {
            command.arg(APPROX_FLAG);
        }
        command
            .arg(format!("{CONTAINER_INPUT}/{}", case.relative))
            .arg(format!("{CONTAINER_OUTPUT}/{}", case.relative));
        command
    }
}

/// Settings of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Corpus root walked for test files.
    pub input_root: PathBuf,
    /// Root mirrored for program output.
    pub output_root: PathBuf,
    /// Log file, truncated at the start of the run.
    pub log_path: PathBuf,
    /// Upper bound on the wall time of one test case.
    pub timeout: Duration,
    /// Restricts the run to one algorithm.
    pub mode: Option<Algorithm>,
    /// Restricts the run to files below a directory with one of these names.
    pub types: Vec<String>,
}

impl RunConfig {
    fn selects(&self, segments: &[String], algorithm: Algorithm) -> bool {
        let mode_matches = self.mode.is_none_or(|mode| mode == algorithm);
        let type_matches = self.types.is_empty()
            || segments
                .iter()
                .any(|segment| self.types.iter().any(|kind| kind == segment));
        mode_matches && type_matches
    }
}

/// What happened to one test case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseOutcome {
    /// The program exited successfully after this long.
    Completed(Duration),
    /// The program exited unsuccessfully, with this code if it had one.
    Failed(Option<i32>),
    /// The program could not be started.
    LaunchFailed,
    /// The program was killed at the timeout.
    TimedOut,
}

impl CaseOutcome {
    /// Value written after the path in the run log.
    #[must_use]
    pub fn log_value(&self) -> String {
        match self {
            Self::Completed(elapsed) => format_elapsed(*elapsed),
            Self::Failed(_) | Self::LaunchFailed => "ERROR".to_owned(),
            Self::TimedOut => "TIMEOUT".to_owned(),
        }
    }
}

/// Outcome of one test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseResult {
    /// Path relative to the corpus root, `/`-separated.
    pub relative: String,
    /// Algorithm the case ran with.
    pub algorithm: Algorithm,
    /// What happened.
    pub outcome: CaseOutcome,
}

/// Outcome of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Log written by the run.
    pub log_path: PathBuf,
    /// Results in execution order.
    pub cases: Vec<CaseResult>,
}

impl RunReport {
    /// Number of successful cases.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Completed(_)))
    }

    /// Number of cases that failed or could not be launched.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Failed(_) | CaseOutcome::LaunchFailed))
    }

    /// Number of cases killed at the timeout.
    #[must_use]
    pub fn timed_out(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::TimedOut))
    }

    fn count(&self, predicate: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.cases
            .iter()
            .filter(|case| predicate(&case.outcome))
            .count()
    }
}

/// Lists `.txt` files below `root` as `/`-separated relative segment lists,
/// in sorted order.
///
/// # Errors
/// Returns [`RunnerError::ReadDir`] when a directory cannot be listed.
pub fn discover_cases(root: &Path) -> Result<Vec<Vec<String>>, RunnerError> {
    let mut cases = Vec::new();
    let walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|err| RunnerError::ReadDir {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "txt") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let segments: Option<Vec<String>> = relative
            .components()
            .map(|component| component.as_os_str().to_str().map(str::to_owned))
            .collect();
        match segments {
            Some(segments) => cases.push(segments),
            None => warn!(path = %path.display(), "skipping non UTF-8 path"),
        }
    }
    Ok(cases)
}

/// Appends lines to the run log, flushing after each one.
struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    fn create(path: &Path) -> Result<Self, RunnerError> {
        let log_error = |source| RunnerError::Log {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(log_error)?;
        }
        let file = File::create(path).map_err(log_error)?;
        let mut log = Self {
            path: path.to_path_buf(),
            file,
        };
        let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        log.line(&format!("Execution Log - Started at {started}"))?;
        log.line(&"-".repeat(50))?;
        Ok(log)
    }

    fn line(&mut self, text: &str) -> Result<(), RunnerError> {
        writeln!(self.file, "{text}")
            .and_then(|()| self.file.flush())
            .map_err(|source| RunnerError::Log {
                path: self.path.clone(),
                source,
            })
    }
}

/// Runs every selected test case of `config.input_root` through `launcher`.
///
/// # Errors
/// Returns [`RunnerError`] when the corpus cannot be listed, an output
/// directory cannot be created, or the log cannot be written. Individual
/// program failures and timeouts are recorded in the report and the log.
#[instrument(
    name = "runner.run_corpus",
    err,
    skip(config, launcher),
    fields(input_root = %config.input_root.display(), cases = field::Empty),
)]
pub fn run_corpus(config: &RunConfig, launcher: &dyn Launch) -> Result<RunReport, RunnerError> {
    let selected: Vec<(Vec<String>, Algorithm)> = discover_cases(&config.input_root)?
        .into_iter()
        .map(|segments| {
            let algorithm = if segments.iter().any(|segment| segment == "approx") {
                Algorithm::Approx
            } else {
                Algorithm::Exact
            };
            (segments, algorithm)
        })
        .filter(|(segments, algorithm)| config.selects(segments, *algorithm))
        .collect();
    Span::current().record("cases", selected.len());

    let mut log = RunLog::create(&config.log_path)?;
    let mut report = RunReport {
        log_path: config.log_path.clone(),
        cases: Vec::with_capacity(selected.len()),
    };
    for (segments, algorithm) in selected {
        let relative = segments.join("/");
        let input = segments
            .iter()
            .fold(config.input_root.clone(), |path, segment| path.join(segment));
        let output = segments
            .iter()
            .fold(config.output_root.clone(), |path, segment| path.join(segment));
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|source| RunnerError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let case = CaseFiles {
            relative: &relative,
            input: &input,
            output: &output,
            algorithm,
        };
        let outcome = run_case(launcher.command(&case), &relative, config.timeout);
        log.line(&format!("{relative}: {}", outcome.log_value()))?;
        report.cases.push(CaseResult {
            relative,
            algorithm,
            outcome,
        });
    }

    info!(
        completed = report.completed(),
        failed = report.failed(),
        timed_out = report.timed_out(),
        log = %config.log_path.display(),
        "run finished"
    );
    Ok(report)
}

fn run_case(mut command: Command, relative: &str, timeout: Duration) -> CaseOutcome {
    let started = Instant::now();
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    let mut child = match child {
        Ok(child) => child,
        Err(err) => {
            warn!(case = relative, error = %err, "failed to launch comparison program");
            return CaseOutcome::LaunchFailed;
        }
    };

    match wait_with_timeout(&mut child, timeout) {
        Ok(Some(status)) if status.success() => {
            let elapsed = started.elapsed();
            debug!(case = relative, elapsed_ms = elapsed.as_millis(), "test case completed");
            CaseOutcome::Completed(elapsed)
        }
        Ok(Some(status)) => {
            warn!(case = relative, status = %status, "comparison program failed");
            CaseOutcome::Failed(status.code())
        }
        Ok(None) => {
            warn!(case = relative, timeout_ms = timeout.as_millis(), "comparison program timed out");
            CaseOutcome::TimedOut
        }
        Err(err) => {
            warn!(case = relative, error = %err, "failed to wait for comparison program");
            CaseOutcome::Failed(None)
        }
    }
}

/// Waits for `child`, killing it once `timeout` has elapsed.
///
/// Returns `Ok(None)` when the child was killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let waited = started.elapsed();
        if waited >= timeout {
            if let Err(err) = child.kill() {
                debug!(error = %err, "kill after timeout failed; child already exited");
            }
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(waited)));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use grafy_core::{ExperimentDimension, parse_log_str};
    use rstest::rstest;
    use tempfile::TempDir;

    const COPY_SCRIPT: &str = "[ \"$1\" = -a ] && shift\ncp \"$1\" \"$2\"\n";

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let dir = TempDir::new().expect("temp dir");
            for file in files {
                let path = dir.path().join("input").join(file);
                fs::create_dir_all(path.parent().expect("parent")).expect("dirs");
                fs::write(&path, "1\n0\n1\n0\n1").expect("test file");
            }
            Self { dir }
        }

        fn launcher(&self, script: &str) -> DirectLauncher {
            let path = self.dir.path().join("program.sh");
            fs::write(&path, script).expect("script");
            DirectLauncher {
                program: PathBuf::from("/bin/sh"),
                args: vec![path.display().to_string()],
            }
        }

        fn config(&self) -> RunConfig {
            RunConfig {
                input_root: self.dir.path().join("input"),
                output_root: self.dir.path().join("output"),
                log_path: self.dir.path().join("logs/run.log"),
                timeout: Duration::from_secs(30),
                mode: None,
                types: Vec::new(),
            }
        }
    }

    const CORPUS: [&str; 4] = [
        "test_k_input/exact/random/test_n1_000050_n2_000025_k_010_001.txt",
        "test_k_input/approx/random/test_n1_000050_n2_000025_k_010_001.txt",
        "test_k_input/approx/grid/test_n1_000009_n2_000008_k_002_001.txt",
        "test_k_input/approx/grid/notes.md",
    ];

    #[test]
    fn discovers_txt_files_in_sorted_order() {
        let fixture = Fixture::new(&CORPUS);
        let cases: Vec<String> = discover_cases(&fixture.config().input_root)
            .expect("walk")
            .iter()
            .map(|segments| segments.join("/"))
            .collect();
        assert_eq!(
            cases,
            vec![
                "test_k_input/approx/grid/test_n1_000009_n2_000008_k_002_001.txt",
                "test_k_input/approx/random/test_n1_000050_n2_000025_k_010_001.txt",
                "test_k_input/exact/random/test_n1_000050_n2_000025_k_010_001.txt",
            ]
        );
    }

    #[test]
    fn discovery_interleaves_files_and_directories_by_name() {
        let fixture = Fixture::new(&["b.txt", "a/x.txt", "c/y.txt", "d.txt/z.txt", "c/skip.log"]);
        let cases = discover_cases(&fixture.config().input_root).expect("walk");
        assert_eq!(
            cases,
            vec![
                vec!["a".to_owned(), "x.txt".to_owned()],
                vec!["b.txt".to_owned()],
                vec!["c".to_owned(), "y.txt".to_owned()],
                vec!["d.txt".to_owned(), "z.txt".to_owned()],
            ]
        );
    }

    #[test]
    fn successful_runs_produce_a_parsable_log() {
        let fixture = Fixture::new(&CORPUS);
        let config = fixture.config();
        let report = run_corpus(&config, &fixture.launcher(COPY_SCRIPT)).expect("run");

        assert_eq!(report.completed(), 3);
        for case in &report.cases {
            assert!(config.output_root.join(&case.relative).is_file());
        }
        let log = fs::read_to_string(&config.log_path).expect("log");
        assert!(log.starts_with("Execution Log - Started at "));
        let parsed = parse_log_str(&log);
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.skipped_lines, 2);
        assert!(parsed
            .records
            .iter()
            .all(|record| record.dimension == ExperimentDimension::K && record.elapsed_ms.is_some()));
        let algorithms: Vec<Algorithm> = parsed.records.iter().map(|record| record.algorithm).collect();
        assert_eq!(algorithms, vec![Algorithm::Approx, Algorithm::Approx, Algorithm::Exact]);
    }

    #[test]
    fn approx_flag_follows_the_path() {
        let fixture = Fixture::new(&CORPUS);
        // Fails unless `-a` is present exactly for approx files.
        let script = "case \"$2\" in */approx/*) [ \"$1\" = -a ] ;; *) [ \"$1\" != -a ] ;; esac\n";
        let report = run_corpus(&fixture.config(), &fixture.launcher(script)).expect("run");
        assert_eq!(report.completed(), 3, "{:?}", report.cases);
    }

    #[test]
    fn failures_and_timeouts_are_logged_without_aborting() {
        let fixture = Fixture::new(&CORPUS);
        let config = RunConfig {
            timeout: Duration::from_millis(200),
            ..fixture.config()
        };
        let script = "case \"$2\" in */grid/*) exit 3 ;; */exact/*) exec sleep 5 ;; esac\n";
        let report = run_corpus(&config, &fixture.launcher(script)).expect("run");

        let outcomes: Vec<CaseOutcome> = report.cases.iter().map(|case| case.outcome).collect();
        assert_eq!(outcomes.first(), Some(&CaseOutcome::Failed(Some(3))));
        assert!(matches!(outcomes.get(1), Some(CaseOutcome::Completed(_))));
        assert_eq!(outcomes.get(2), Some(&CaseOutcome::TimedOut));

        let log = fs::read_to_string(&config.log_path).expect("log");
        let tail: Vec<&str> = log.lines().skip(2).collect();
        assert!(tail.first().is_some_and(|line| line.ends_with(": ERROR")));
        assert!(tail.get(2).is_some_and(|line| line.ends_with(": TIMEOUT")));
    }

    #[rstest]
    #[case::exact_only(Some(Algorithm::Exact), vec![], 1)]
    #[case::approx_only(Some(Algorithm::Approx), vec![], 2)]
    #[case::grid_only(None, vec!["grid".to_owned()], 1)]
    #[case::random_exact(Some(Algorithm::Exact), vec!["random".to_owned()], 1)]
    #[case::no_match(Some(Algorithm::Exact), vec!["grid".to_owned()], 0)]
    fn filters_select_cases(
        #[case] mode: Option<Algorithm>,
        #[case] types: Vec<String>,
        #[case] expected: usize,
    ) {
        let fixture = Fixture::new(&CORPUS);
        let config = RunConfig {
            mode,
            types,
            ..fixture.config()
        };
        let report = run_corpus(&config, &fixture.launcher(COPY_SCRIPT)).expect("run");
        assert_eq!(report.cases.len(), expected);
    }

    #[test]
    fn missing_program_is_logged_as_error() {
        let fixture = Fixture::new(&CORPUS[..1]);
        let launcher = DirectLauncher {
            program: PathBuf::from("/definitely/not/a/program"),
            args: Vec::new(),
        };
        let report = run_corpus(&fixture.config(), &launcher).expect("run");
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.cases.first().map(|case| case.outcome),
            Some(CaseOutcome::LaunchFailed)
        );
    }

    #[test]
    fn missing_corpus_root_aborts() {
        let fixture = Fixture::new(&[]);
        let err = run_corpus(&fixture.config(), &fixture.launcher(COPY_SCRIPT))
            .expect_err("missing root must fail");
        assert!(matches!(err, RunnerError::ReadDir { .. }));
    }

    #[test]
    fn direct_launcher_appends_case_arguments() {
        let case = CaseFiles {
            relative: "test_k_input/approx/random/a.txt",
            input: Path::new("/host/in/test_k_input/approx/random/a.txt"),
            output: Path::new("/host/out/test_k_input/approx/random/a.txt"),
            algorithm: Algorithm::Approx,
        };
        let direct = DirectLauncher {
            program: PathBuf::from("prog"),
            args: vec!["--fast".to_owned()],
        };
        let args: Vec<String> = direct
            .command(&case)
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--fast",
                "-a",
                "/host/in/test_k_input/approx/random/a.txt",
                "/host/out/test_k_input/approx/random/a.txt",
            ]
        );
    }
}
