//! SVG line chart of one series.

use std::fmt::{self, Write as _};

use grafy_core::{Scenario, Series};

use crate::{
    scale::Axis,
    style::{Marker, SeriesStyle},
};

const WIDTH: f64 = 1_000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 70.0;
const TARGET_TICKS: u32 = 6;
const MARKER_SIZE: f64 = 4.5;

/// A single-series line chart ready to be rendered as SVG.
///
/// Rendering goes through [`fmt::Display`], so `chart.to_string()` yields
/// the complete document.
#[derive(Clone, Debug, PartialEq)]
pub struct LineChart {
    /// First title line.
    pub title: String,
    /// Second title line.
    pub subtitle: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// Legend entry of the series.
    pub legend: String,
    /// Series colour and marker.
    pub style: SeriesStyle,
    /// Data points in drawing order.
    pub points: Vec<(f64, f64)>,
}

impl LineChart {
    /// Chart of `series` within `scenario`.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "parameter values are small enough to be exact in f64"
    )]
    pub fn for_series(scenario: &Scenario, series: &Series) -> Self {
        let dimension = scenario.dimension.as_str();
        Self {
            title: format!(
                "{} Avg Execution Time vs {}",
                series.algorithm.title(),
                dimension.to_uppercase()
            ),
            subtitle: format!("(Fixed: {})", scenario.fixed),
            x_label: format!("{dimension} value"),
            y_label: "Time [ms]".to_owned(),
            legend: series.algorithm.title().to_owned(),
            style: SeriesStyle::for_algorithm(series.algorithm),
            points: series
                .points
                .iter()
                .map(|point| (point.x as f64, point.mean_ms))
                .collect(),
        }
    }

    fn axes(&self) -> (Axis, Axis) {
        if self.points.is_empty() {
            return (
                Axis::covering(0.0, 1.0, TARGET_TICKS),
                Axis::from_zero(1.0, TARGET_TICKS),
            );
        }
        let (x_low, x_high) = bounds(self.points.iter().map(|&(x, _)| x));
        let (_, y_high) = bounds(self.points.iter().map(|&(_, y)| y));
        (
            Axis::covering(x_low, x_high, TARGET_TICKS),
            Axis::from_zero(y_high, TARGET_TICKS),
        )
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
        (low.min(value), high.max(value))
    })
}

/// Maps data coordinates onto the plot area.
struct Frame {
    x: Axis,
    y: Axis,
}

#[expect(clippy::float_arithmetic, reason = "pixel coordinates are computed in floating point")]
impl Frame {
    const LEFT: f64 = MARGIN_LEFT;
    const RIGHT: f64 = WIDTH - MARGIN_RIGHT;
    const TOP: f64 = MARGIN_TOP;
    const BOTTOM: f64 = HEIGHT - MARGIN_BOTTOM;

    fn px(&self, x: f64) -> f64 {
        Self::LEFT + self.x.fraction(x) * (Self::RIGHT - Self::LEFT)
    }

    fn py(&self, y: f64) -> f64 {
        Self::BOTTOM - self.y.fraction(y) * (Self::BOTTOM - Self::TOP)
    }
}

impl fmt::Display for LineChart {
    #[expect(clippy::float_arithmetic, reason = "layout offsets are computed in floating point")]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.axes();
        let frame = Frame { x, y };
        let centre_x = (Frame::LEFT + Frame::RIGHT) / 2.0;
        let centre_y = (Frame::TOP + Frame::BOTTOM) / 2.0;

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
        )?;
        writeln!(f, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            f,
            r#"<text x="{centre_x}" y="32" text-anchor="middle" font-size="18">{}</text>"#,
            Escaped(&self.title)
        )?;
        writeln!(
            f,
            r#"<text x="{centre_x}" y="56" text-anchor="middle" font-size="14">{}</text>"#,
            Escaped(&self.subtitle)
        )?;

        for tick in frame.y.ticks() {
            let py = frame.py(tick);
            writeln!(
                f,
                r##"<line x1="{}" y1="{py:.1}" x2="{}" y2="{py:.1}" stroke="#cccccc" stroke-dasharray="4 4"/>"##,
                Frame::LEFT,
                Frame::RIGHT
            )?;
            writeln!(
                f,
                r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="12">{}</text>"#,
                Frame::LEFT - 8.0,
                py + 4.0,
                frame.y.label(tick)
            )?;
        }
        for tick in frame.x.ticks() {
            let px = frame.px(tick);
            writeln!(
                f,
                r##"<line x1="{px:.1}" y1="{}" x2="{px:.1}" y2="{}" stroke="#cccccc" stroke-dasharray="4 4"/>"##,
                Frame::TOP,
                Frame::BOTTOM
            )?;
            writeln!(
                f,
                r#"<text x="{px:.1}" y="{}" text-anchor="middle" font-size="12">{}</text>"#,
                Frame::BOTTOM + 20.0,
                frame.x.label(tick)
            )?;
        }

        writeln!(
            f,
            r#"<polyline fill="none" stroke="black" points="{left},{top} {left},{bottom} {right},{bottom}"/>"#,
            left = Frame::LEFT,
            top = Frame::TOP,
            bottom = Frame::BOTTOM,
            right = Frame::RIGHT
        )?;
        writeln!(
            f,
            r#"<text x="{centre_x}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
            HEIGHT - 20.0,
            Escaped(&self.x_label)
        )?;
        writeln!(
            f,
            r#"<text x="24" y="{centre_y}" text-anchor="middle" font-size="14" transform="rotate(-90 24 {centre_y})">{}</text>"#,
            Escaped(&self.y_label)
        )?;

        let mut path = String::new();
        for &(x, y) in &self.points {
            if !path.is_empty() {
                path.push(' ');
            }
            write!(path, "{:.1},{:.1}", frame.px(x), frame.py(y))?;
        }
        writeln!(
            f,
            r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{path}"/>"#,
            self.style.color
        )?;
        for &(x, y) in &self.points {
            write_marker(f, self.style, frame.px(x), frame.py(y))?;
        }

        let legend_x = Frame::RIGHT - 130.0;
        let legend_y = Frame::TOP + 20.0;
        writeln!(
            f,
            r##"<rect x="{}" y="{}" width="120" height="30" fill="white" stroke="#999999"/>"##,
            legend_x - 10.0,
            legend_y - 15.0
        )?;
        writeln!(
            f,
            r#"<line x1="{legend_x}" y1="{legend_y}" x2="{}" y2="{legend_y}" stroke="{}" stroke-width="2"/>"#,
            legend_x + 30.0,
            self.style.color
        )?;
        write_marker(f, self.style, legend_x + 15.0, legend_y)?;
        writeln!(
            f,
            r#"<text x="{}" y="{}" font-size="13">{}</text>"#,
            legend_x + 40.0,
            legend_y + 4.0,
            Escaped(&self.legend)
        )?;
        writeln!(f, "</svg>")
    }
}

#[expect(clippy::float_arithmetic, reason = "marker geometry")]
fn write_marker(f: &mut fmt::Formatter<'_>, style: SeriesStyle, cx: f64, cy: f64) -> fmt::Result {
    match style.marker {
        Marker::Square => writeln!(
            f,
            r#"<rect x="{:.1}" y="{:.1}" width="{side}" height="{side}" fill="{}"/>"#,
            cx - MARKER_SIZE,
            cy - MARKER_SIZE,
            style.color,
            side = MARKER_SIZE * 2.0
        ),
        Marker::Circle => writeln!(
            f,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{MARKER_SIZE}" fill="{}"/>"#,
            style.color
        ),
    }
}

/// Escapes XML text content.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                other => f.write_char(other)?,
            }
        }
        Ok(())
    }
}
