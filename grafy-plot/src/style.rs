//! Fixed per-algorithm series styling.

use grafy_core::Algorithm;

/// Marker drawn at each data point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Filled square.
    Square,
    /// Filled circle.
    Circle,
}

/// Colour and marker of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeriesStyle {
    /// SVG colour of the line and markers.
    pub color: &'static str,
    /// Point marker.
    pub marker: Marker,
}

impl SeriesStyle {
    /// Style of `algorithm`: exact is red with squares, approximate is blue
    /// with circles, in every chart.
    #[must_use]
    pub const fn for_algorithm(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Exact => Self {
                color: "#d62728",
                marker: Marker::Square,
            },
            Algorithm::Approx => Self {
                color: "#1f77b4",
                marker: Marker::Circle,
            },
        }
    }
}
