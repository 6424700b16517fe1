use std::ops::Range;

use plotters::style::RGBColor;

use crate::sources::Product;

/// How one overlaid series and its vertical axis are drawn.
#[derive(Clone, Debug)]
pub struct AxisStyle {
    /// Axis label, with units.
    pub label: String,
    /// Color of the line, the axis and its labels.
    pub color: RGBColor,
    /// The axis always covers at least this range.
    pub floor: (f64, f64),
    /// Draw a dashed horizontal line at zero.
    pub zero_line: bool,
    /// Line width in pixels.
    pub line_width: u32,
}

impl AxisStyle {
    /// The usual style for a product.
    pub fn for_product(product: Product) -> Self {
        let (r, g, b) = product.color();
        AxisStyle {
            label: product.label().to_owned(),
            color: RGBColor(r, g, b),
            floor: product.axis_floor(),
            zero_line: product.zero_line(),
            line_width: 6,
        }
    }
}

/// Linear map from a value range onto `[0, 1]` and onto pixel rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMap {
    lo: f64,
    hi: f64,
}

impl AxisMap {
    /// Map `[lo, hi]`. A degenerate range is widened by one unit.
    pub fn new(lo: f64, hi: f64) -> Self {
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
        AxisMap { lo, hi }
    }

    /// Lower limit.
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Upper limit.
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Is `value` inside the limits?
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Fraction of the way from `lo` to `hi`.
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.lo) / (self.hi - self.lo)
    }

    /// Pixel row of `value` on an axis whose top row is `rows.start` and bottom row `rows.end`.
    pub fn to_row(&self, value: f64, rows: &Range<i32>) -> i32 {
        let span = f64::from(rows.end - rows.start);
        rows.end - (self.normalize(value) * span).round() as i32
    }
}

/// Round tick values inside `[lo, hi]` with roughly `target` intervals.
///
/// Steps are 1, 2, 2.5 or 5 times a power of ten.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return vec![];
    }

    let raw = (hi - lo) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;

    (first..=last)
        .map(|i| i as f64 * step)
        // Avoid printing -0.
        .map(|v| if v == 0.0 { 0.0 } else { v })
        .collect()
}

/// Format a tick value with just enough decimals for `step`.
pub fn format_tick(value: f64, step: f64) -> String {
    if step >= 1.0 || step <= 0.0 {
        format!("{:.0}", value)
    } else {
        let decimals = (-step.log10()).ceil().max(1.0) as usize;
        format!("{:.*}", decimals, value)
    }
}

/// Split `[start, end]` into dashes of length `dash` separated by gaps of length `gap`.
pub fn dash_segments(start: f64, end: f64, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    if !(dash > 0.0) || !(gap >= 0.0) || !(end > start) {
        return vec![];
    }

    let mut dashes = vec![];
    let mut pos = start;
    while pos < end {
        dashes.push((pos, (pos + dash).min(end)));
        pos += dash + gap;
    }
    dashes
}

/// Pixels needed right of the plotting area for `n_axes` value axes.
pub fn right_margin(n_axes: usize, axis_offset: u32, font_px: u32) -> u32 {
    if n_axes == 0 {
        font_px * 2
    } else {
        (n_axes as u32 - 1) * axis_offset + axis_offset.max(font_px * 5)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
