//! Command-line interface orchestration for corpus generation, runs and
//! reporting.

mod commands;
mod summary;

pub use commands::{
    Cli, CliError, Command, GenerateCommand, ModeArg, ReportCommand, RunCommand, SweepCommand,
    SweepType, TopologyArg, run_cli,
};
pub use summary::{ExecutionSummary, ReportSummary, render_summary};
