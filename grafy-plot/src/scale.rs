//! Linear axes with rounded tick steps.

/// Upper bound on ticks per axis.
const MAX_TICKS: usize = 50;

/// A linear axis spanning `[min, max]` in multiples of `step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Axis {
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) step: f64,
}

impl Axis {
    /// Builds an axis covering `[low, high]` with roughly `target` ticks.
    ///
    /// An empty or inverted range is widened by one unit on each side, so a
    /// single data point still sits in the middle of the chart.
    #[expect(clippy::float_arithmetic, reason = "axis bounds are computed in floating point")]
    pub(crate) fn covering(low: f64, high: f64, target: u32) -> Self {
        let (low, high) = if high > low {
            (low, high)
        } else {
            (low - 1.0, high + 1.0)
        };
        let step = nice_step((high - low) / f64::from(target.max(1)));
        Self {
            min: (low / step).floor() * step,
            max: (high / step).ceil() * step,
            step,
        }
    }

    /// Axis from zero up to `high`, or up to one when `high` is not positive.
    pub(crate) fn from_zero(high: f64, target: u32) -> Self {
        Self::covering(0.0, if high > 0.0 { high } else { 1.0 }, target)
    }

    /// Position of `value` as a fraction of the axis span.
    #[expect(clippy::float_arithmetic, reason = "mapping values onto the axis")]
    pub(crate) fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    /// Tick positions from `min` to `max` inclusive.
    #[expect(clippy::float_arithmetic, reason = "tick positions are multiples of the step")]
    pub(crate) fn ticks(&self) -> Vec<f64> {
        let tolerance = self.step * 1e-9;
        let mut ticks = Vec::new();
        let mut value = self.min;
        while value <= self.max + tolerance && ticks.len() < MAX_TICKS {
            ticks.push(value);
            value += self.step;
        }
        ticks
    }

    /// Formats a tick label with as many decimals as the step needs.
    pub(crate) fn label(&self, value: f64) -> String {
        if self.step >= 1.0 {
            format!("{value:.0}")
        } else if self.step >= 0.1 {
            format!("{value:.1}")
        } else {
            format!("{value:.2}")
        }
    }
}

/// Rounds `raw` up to 1, 2 or 5 times a power of ten.
#[expect(clippy::float_arithmetic, reason = "step rounding works on magnitudes")]
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
