//! SVG charts of aggregated timing scenarios.
//!
//! One chart is written per scenario and algorithm. Charting is
//! presentation only: a failure here leaves the aggregation untouched.

mod chart;
mod scale;
mod style;

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use grafy_core::{Aggregation, Algorithm, ExperimentDimension, FixedParameters};
use thiserror::Error;
use tracing::{info, instrument};

pub use crate::{
    chart::LineChart,
    style::{Marker, SeriesStyle},
};

/// Errors raised while writing charts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlotError {
    /// The output directory could not be created.
    #[error("failed to create chart directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A chart file could not be written.
    #[error("failed to write chart {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Chart file name, e.g. `plot_exact_var_k_n1-50_n2-25.svg`.
///
/// # Examples
/// ```
/// use grafy_core::{Algorithm, ExperimentDimension, FixedParameters};
/// use grafy_plot::plot_file_name;
///
/// let fixed = FixedParameters { names: ["n1", "n2"], values: [50, 25] };
/// assert_eq!(
///     plot_file_name(Algorithm::Exact, &ExperimentDimension::K, &fixed),
///     "plot_exact_var_k_n1-50_n2-25.svg",
/// );
/// ```
#[must_use]
pub fn plot_file_name(
    algorithm: Algorithm,
    dimension: &ExperimentDimension,
    fixed: &FixedParameters,
) -> String {
    format!(
        "plot_{algorithm}_var_{dimension}_{}.svg",
        fixed.file_fragment()
    )
}

/// Writes one SVG per scenario and algorithm into `out_dir`.
///
/// Returns the written paths in scenario order.
///
/// # Errors
/// Returns [`PlotError::CreateDir`] when `out_dir` cannot be created and
/// [`PlotError::Write`] for the first chart that cannot be written.
#[instrument(
    name = "plot.emit_all",
    err,
    skip(aggregation),
    fields(out_dir = %out_dir.display(), scenarios = aggregation.scenarios.len()),
)]
pub fn emit_all(aggregation: &Aggregation, out_dir: &Path) -> Result<Vec<PathBuf>, PlotError> {
    fs::create_dir_all(out_dir).map_err(|source| PlotError::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for scenario in &aggregation.scenarios {
        for series in &scenario.series {
            let path = out_dir.join(plot_file_name(
                series.algorithm,
                &scenario.dimension,
                &scenario.fixed,
            ));
            let chart = LineChart::for_series(scenario, series);
            fs::write(&path, chart.to_string()).map_err(|source| PlotError::Write {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), points = series.points.len(), "generated plot");
            written.push(path);
        }
    }
    Ok(written)
}
