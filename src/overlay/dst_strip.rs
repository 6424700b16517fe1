use image::RgbImage;
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{dash_segments, format_tick, nice_ticks, plot_err, AxisMap};

use crate::{errors::KeoDataErr, series::TimeSeries};

/// A narrow vertical plot of Dst to sit left of a monthly keogram stack.
///
/// Time runs down the strip from the first to the last sample and Dst increases to the right.
/// The time axis is not labelled since the strip lines up with the keogram rows.
#[derive(Clone, Debug)]
pub struct DstStrip {
    /// Width of the strip as a fraction of its height.
    pub width_ratio: f64,
    /// Width of the Dst line in pixels.
    pub line_width: u32,
    /// Color of the Dst line.
    pub color: RGBColor,
    /// Color of the dashed zero line.
    pub zero_color: RGBColor,
    /// Tick label size in pixels.
    pub font_px: u32,
}

impl Default for DstStrip {
    fn default() -> Self {
        DstStrip {
            width_ratio: 0.2,
            line_width: 20,
            color: RGBColor(65, 105, 225),
            zero_color: BLUE,
            font_px: 100,
        }
    }
}

impl DstStrip {
    /// Width of a strip to go with a keogram `height` pixels tall.
    pub fn strip_width(&self, height: u32) -> u32 {
        ((f64::from(height) * self.width_ratio) as u32).max(1)
    }

    /// Value limits: the data range with 5% margins on either side.
    pub fn value_map(&self, series: &TimeSeries) -> Option<AxisMap> {
        let lo = series.values().iter().copied().fold(f64::INFINITY, f64::min);
        let hi = series.values().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }

        let pad = (hi - lo) * 0.05;
        Some(AxisMap::new(lo - pad, hi + pad))
    }

    /// Pixel positions of every sample for a strip `width` x `height`.
    pub fn points(&self, series: &TimeSeries, width: u32, height: u32) -> Vec<(i32, i32)> {
        let map = match self.value_map(series) {
            Some(map) => map,
            None => return vec![],
        };

        let (t0, t1) = match (series.times().first(), series.times().last()) {
            (Some(&t0), Some(&t1)) if t1 > t0 => (t0, t1),
            _ => return vec![],
        };
        let span = (t1 - t0).num_seconds() as f64;
        let bottom = f64::from(height.saturating_sub(1));
        let right = f64::from(width.saturating_sub(1));

        series
            .iter()
            .map(|(t, v)| {
                let y = ((t - t0).num_seconds() as f64 / span * bottom).round() as i32;
                let x = (map.normalize(v) * right).round() as i32;
                (x, y)
            })
            .collect()
    }

    /// Draw the strip for a keogram `height` pixels tall.
    pub fn render(&self, series: &TimeSeries, height: u32) -> Result<RgbImage, KeoDataErr> {
        let width = self.strip_width(height);
        let points = self.points(series, width, height);
        let map = self.value_map(series);

        let map = match map {
            Some(map) if points.len() >= 2 => map,
            _ => return Err(KeoDataErr::NotEnoughData),
        };

        let mut buffer = vec![255u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;

            let right = f64::from(width.saturating_sub(1));
            let x_of = |v: f64| (map.normalize(v) * right).round() as i32;

            let ticks = nice_ticks(map.lo(), map.hi(), 4);
            let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
            let grid = BLACK.mix(0.25).stroke_width(2);
            let label_style = ("sans-serif", f64::from(self.font_px))
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            let tick_len = (self.font_px / 2) as i32;
            let bottom = height as i32 - 1;

            for tick in ticks {
                let x = x_of(tick);
                root.draw(&PathElement::new(vec![(x, 0), (x, bottom)], grid))
                    .map_err(plot_err)?;
                root.draw(&PathElement::new(
                    vec![(x, bottom - tick_len), (x, bottom)],
                    BLACK.stroke_width(3),
                ))
                .map_err(plot_err)?;
                root.draw(&Text::new(
                    format_tick(tick, step),
                    (x, bottom - tick_len - 8),
                    label_style.clone(),
                ))
                .map_err(plot_err)?;
            }

            if map.contains(0.0) {
                let x = x_of(0.0);
                let dash = f64::from(height) / 100.0;
                for (a, b) in dash_segments(0.0, f64::from(height), dash, dash / 2.0) {
                    root.draw(&PathElement::new(
                        vec![(x, a as i32), (x, b as i32)],
                        self.zero_color.stroke_width(self.line_width),
                    ))
                    .map_err(plot_err)?;
                }
            }

            root.draw(&PathElement::new(
                points,
                self.color.stroke_width(self.line_width),
            ))
            .map_err(plot_err)?;

            root.present().map_err(plot_err)?;
        }

        RgbImage::from_raw(width, height, buffer)
            .ok_or(KeoDataErr::LogicError("strip buffer has the wrong size"))
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
