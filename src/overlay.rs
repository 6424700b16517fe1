//! Plots of space weather series over a keogram on a shared time axis.
//!
//! The keogram fills the plotting area, which spans the window in x and `[0, 1]` in y. Each
//! overlay is scaled onto `[0, 1]` through its own [`AxisMap`] and gets a value axis right of the
//! plotting area, each one further out than the last.

use std::{fmt::Display, ops::Range, path::Path};

use image::{imageops, imageops::FilterType, RgbImage};
use log::warn;
use plotters::{
    coord::Shift,
    prelude::*,
    style::{
        text_anchor::{HPos, Pos, VPos},
        FontTransform,
    },
};

use crate::{
    errors::KeoDataErr,
    keogram::{write_png, Keogram},
    series::{axis_limits, AlignedSeries},
    window::{format_hour, TimeWindow},
};

mod axis;
mod dst_strip;

pub use axis::{dash_segments, format_tick, nice_ticks, right_margin, AxisMap, AxisStyle};
pub use dst_strip::DstStrip;

/// Lines are broken where consecutive samples are further apart than this, in hours.
pub const MAX_GAP_HOURS: f64 = 5.0 / 60.0;

pub(crate) fn plot_err<E: Display>(err: E) -> KeoDataErr {
    KeoDataErr::Plot(err.to_string())
}

/// Size and decoration of an overlay plot.
#[derive(Clone, Debug)]
pub struct PlotOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Hours between x ticks.
    pub tick_step: f64,
    /// Title above the plot.
    pub title: String,
    /// Label under the time axis.
    pub x_label: String,
    /// Horizontal distance between successive value axes, in pixels.
    pub axis_offset: u32,
    /// Base font size in pixels.
    pub font_px: u32,
    /// See [`MAX_GAP_HOURS`].
    pub max_gap_hours: f64,
}

impl PlotOptions {
    /// A 12 x 6 inch plot at 300 DPI with hourly ticks.
    pub fn full_day<S: Into<String>>(title: S) -> Self {
        PlotOptions {
            width: 3600,
            height: 1800,
            tick_step: 1.0,
            title: title.into(),
            x_label: "Time (Hours UTC)".to_owned(),
            axis_offset: 250,
            font_px: 42,
            max_gap_hours: MAX_GAP_HOURS,
        }
    }

    /// A 10 x 5 inch plot at 300 DPI with ticks every quarter hour.
    pub fn partial<S: Into<String>>(title: S) -> Self {
        PlotOptions {
            width: 3000,
            height: 1500,
            tick_step: 0.25,
            x_label: "Time (UTC)".to_owned(),
            ..Self::full_day(title)
        }
    }
}

/// A series with the style of its axis.
#[derive(Clone, Debug)]
pub struct Overlay {
    series: AlignedSeries,
    style: AxisStyle,
}

impl Overlay {
    /// The data.
    pub fn series(&self) -> &AlignedSeries {
        &self.series
    }

    /// How it is drawn.
    pub fn style(&self) -> &AxisStyle {
        &self.style
    }

    /// Axis limits, the style's floor widened to fit the data.
    pub fn axis_map(&self) -> AxisMap {
        let (lo, hi) = axis_limits(self.series.extrema(), self.style.floor);
        AxisMap::new(lo, hi)
    }
}

/// A keogram with any number of series plotted over it.
#[derive(Clone, Debug)]
pub struct OverlayPlot {
    keogram: Keogram,
    window: TimeWindow,
    overlays: Vec<Overlay>,
    options: PlotOptions,
}

impl OverlayPlot {
    /// Start a plot of `keogram`, which must already be cropped to `window`.
    pub fn new(keogram: Keogram, window: TimeWindow, options: PlotOptions) -> Self {
        OverlayPlot {
            keogram,
            window,
            overlays: vec![],
            options,
        }
    }

    /// Add a series, restricted to the window. Returns false and leaves the plot unchanged if
    /// nothing is left to draw.
    pub fn add(&mut self, series: &AlignedSeries, style: AxisStyle) -> bool {
        let series = series.filter(&self.window);
        if series.is_empty() {
            warn!(
                "No {} data between {} and {}, leaving it off the plot",
                series.name(),
                format_hour(self.window.start_hour()),
                format_hour(self.window.end_hour())
            );
            return false;
        }

        self.overlays.push(Overlay { series, style });
        true
    }

    /// The overlays that will be drawn, innermost axis first.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Draw the plot into an image.
    pub fn render(&self) -> Result<RgbImage, KeoDataErr> {
        let (width, height) = (self.options.width, self.options.height);
        let mut buffer = vec![255u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;
            self.draw(&root)?;
            root.present().map_err(plot_err)?;
        }

        RgbImage::from_raw(width, height, buffer)
            .ok_or(KeoDataErr::LogicError("plot buffer has the wrong size"))
    }

    /// Render and write the plot as a PNG.
    pub fn save(&self, path: &Path) -> Result<(), KeoDataErr> {
        write_png(&self.render()?, path)
    }

    fn draw(&self, root: &DrawingArea<BitMapBackend, Shift>) -> Result<(), KeoDataErr> {
        let opts = &self.options;
        let font = f64::from(opts.font_px);
        let (start, end) = (self.window.start_hour(), self.window.end_hour());

        let mut chart = ChartBuilder::on(root)
            .caption(&opts.title, ("sans-serif", font * 1.3))
            .margin_top(opts.font_px / 2)
            .margin_left(opts.font_px * 2)
            .margin_right(right_margin(self.overlays.len(), opts.axis_offset, opts.font_px))
            .x_label_area_size(opts.font_px * 3)
            .build_cartesian_2d(start..end, 0f64..1f64)
            .map_err(plot_err)?;

        let (cols, rows) = chart.plotting_area().get_pixel_range();
        let plot_w = (cols.end - cols.start).max(1) as u32;
        let plot_h = (rows.end - rows.start).max(1) as u32;

        let keo = imageops::resize(self.keogram.image(), plot_w, plot_h, FilterType::Triangle);
        let elem: BitMapElement<'_, (f64, f64)> =
            BitMapElement::with_owned_buffer((start, 1.0), (plot_w, plot_h), keo.into_raw())
                .ok_or(KeoDataErr::LogicError("keogram buffer has the wrong size"))?;
        chart.draw_series(std::iter::once(elem)).map_err(plot_err)?;

        for overlay in &self.overlays {
            let map = overlay.axis_map();
            let style = &overlay.style;

            for segment in overlay.series.segments(opts.max_gap_hours) {
                let points = segment.into_iter().map(|(x, v)| (x, map.normalize(v)));
                chart
                    .draw_series(LineSeries::new(
                        points,
                        style.color.stroke_width(style.line_width),
                    ))
                    .map_err(plot_err)?;
            }

            if style.zero_line && map.contains(0.0) {
                let y = map.normalize(0.0);
                let span = end - start;
                let dashes = dash_segments(start, end, span / 120.0, span / 240.0)
                    .into_iter()
                    .map(|(a, b)| {
                        PathElement::new(vec![(a, y), (b, y)], style.color.stroke_width(2))
                    });
                chart.draw_series(dashes).map_err(plot_err)?;
            }
        }

        root.draw(&Rectangle::new(
            [(cols.start, rows.start), (cols.end, rows.end)],
            BLACK.stroke_width(2),
        ))
        .map_err(plot_err)?;

        self.draw_time_axis(root, &cols, &rows)?;

        for (i, overlay) in self.overlays.iter().enumerate() {
            let x = cols.end + i as i32 * opts.axis_offset as i32;
            draw_value_axis(root, x, &rows, overlay, opts.font_px)?;
        }

        Ok(())
    }

    fn draw_time_axis(
        &self,
        root: &DrawingArea<BitMapBackend, Shift>,
        cols: &Range<i32>,
        rows: &Range<i32>,
    ) -> Result<(), KeoDataErr> {
        let opts = &self.options;
        let font = f64::from(opts.font_px);
        let tick_len = (opts.font_px / 3) as i32;
        let label_style = ("sans-serif", font)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));

        let (start, end) = (self.window.start_hour(), self.window.end_hour());
        let plot_w = f64::from(cols.end - cols.start);

        for tick in self.window.ticks(opts.tick_step) {
            let x = cols.start + ((tick - start) / (end - start) * plot_w).round() as i32;
            root.draw(&PathElement::new(
                vec![(x, rows.end), (x, rows.end + tick_len)],
                BLACK.stroke_width(2),
            ))
            .map_err(plot_err)?;
            root.draw(&Text::new(
                format_hour(tick),
                (x, rows.end + tick_len + 4),
                label_style.clone(),
            ))
            .map_err(plot_err)?;
        }

        root.draw(&Text::new(
            opts.x_label.clone(),
            ((cols.start + cols.end) / 2, rows.end + opts.font_px as i32 * 2),
            label_style,
        ))
        .map_err(plot_err)?;

        Ok(())
    }
}

fn draw_value_axis(
    root: &DrawingArea<BitMapBackend, Shift>,
    x: i32,
    rows: &Range<i32>,
    overlay: &Overlay,
    font_px: u32,
) -> Result<(), KeoDataErr> {
    let style = overlay.style();
    let map = overlay.axis_map();
    let font = f64::from(font_px);
    let tick_len = (font_px / 3) as i32;

    let label_style = ("sans-serif", font)
        .into_font()
        .color(&style.color)
        .pos(Pos::new(HPos::Left, VPos::Center));

    root.draw(&PathElement::new(
        vec![(x, rows.start), (x, rows.end)],
        style.color.stroke_width(2),
    ))
    .map_err(plot_err)?;

    let ticks = nice_ticks(map.lo(), map.hi(), 6);
    let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
    let mut widest = 0;
    for tick in ticks {
        let y = map.to_row(tick, rows);
        let text = format_tick(tick, step);
        widest = widest.max(text.len() as i32);

        root.draw(&PathElement::new(
            vec![(x, y), (x + tick_len, y)],
            style.color.stroke_width(2),
        ))
        .map_err(plot_err)?;
        root.draw(&Text::new(text, (x + tick_len + 4, y), label_style.clone()))
            .map_err(plot_err)?;
    }

    let title_style = ("sans-serif", font)
        .into_font()
        .transform(FontTransform::Rotate90)
        .color(&style.color)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let label_x = x + tick_len + 8 + widest * (font_px as i32) * 6 / 10;
    root.draw(&Text::new(
        style.label.clone(),
        (label_x, (rows.start + rows.end) / 2),
        title_style,
    ))
    .map_err(plot_err)?;

    Ok(())
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use crate::sources::Product;
    use chrono::NaiveDate;

    fn window() -> TimeWindow {
        TimeWindow::from_hours(NaiveDate::from_ymd_opt(2025, 2, 27).unwrap(), 8, 12).unwrap()
    }

    fn plot() -> OverlayPlot {
        let keo = Keogram::full_day(RgbImage::new(240, 10)).crop(8.0, 12.0);
        OverlayPlot::new(keo, window(), PlotOptions::partial("test"))
    }

    #[test]
    fn test_empty_overlays_are_omitted() {
        let mut plot = plot();

        let outside = AlignedSeries::from_parts("GOES-18 Hp", vec![1.0, 2.0], vec![90.0, 95.0]);
        assert!(!plot.add(&outside, AxisStyle::for_product(Product::GoesMag)));

        let inside =
            AlignedSeries::from_parts("DSCOVR Bz", vec![7.0, 9.0, 10.0], vec![1.0, -3.0, 2.0]);
        assert!(plot.add(&inside, AxisStyle::for_product(Product::DscovrMag)));

        assert_eq!(plot.overlays().len(), 1);
        assert_eq!(plot.overlays()[0].series().len(), 2);
    }

    #[test]
    fn test_axis_limits_follow_floor_and_data() {
        let mut goes = plot();
        let series = AlignedSeries::from_parts("GOES-18 Hp", vec![8.5, 9.0], vec![-20.0, 150.0]);
        goes.add(&series, AxisStyle::for_product(Product::GoesMag));

        let map = goes.overlays()[0].axis_map();
        assert_eq!((map.lo(), map.hi()), (-20.0, 150.0));

        let mut dscovr = plot();
        let series = AlignedSeries::from_parts("DSCOVR Bz", vec![8.5, 9.0], vec![-2.0, 3.0]);
        dscovr.add(&series, AxisStyle::for_product(Product::DscovrMag));
        let map = dscovr.overlays()[0].axis_map();
        assert_eq!((map.lo(), map.hi()), (-15.0, 15.0));
    }

    #[test]
    fn test_plot_options() {
        let full = PlotOptions::full_day("a");
        assert_eq!((full.width, full.height), (3600, 1800));
        assert_eq!(full.tick_step, 1.0);

        let partial = PlotOptions::partial("b");
        assert_eq!((partial.width, partial.height), (3000, 1500));
        assert_eq!(partial.tick_step, 0.25);
        assert_eq!(partial.title, "b");
        assert_eq!(partial.max_gap_hours, MAX_GAP_HOURS);
    }

    #[test]
    fn test_render_fills_plotting_area_with_keogram() {
        let green = image::Rgb([0u8, 200, 0]);
        let keo = Keogram::full_day(RgbImage::from_pixel(240, 10, green)).crop(8.0, 12.0);
        let mut plot = OverlayPlot::new(keo, window(), PlotOptions::partial("render"));

        let hp =
            AlignedSeries::from_parts("GOES-18 Hp", vec![8.5, 9.5, 11.0], vec![80.0, 95.0, 60.0]);
        let bz =
            AlignedSeries::from_parts("DSCOVR Bz", vec![8.2, 10.0, 11.5], vec![-4.0, 3.0, 1.0]);
        assert!(plot.add(&hp, AxisStyle::for_product(Product::GoesMag)));
        assert!(plot.add(&bz, AxisStyle::for_product(Product::DscovrMag)));

        let img = plot.render().unwrap();
        assert_eq!(img.dimensions(), (3000, 1500));

        let keogram_pixels = img.pixels().filter(|p| **p == green).count();
        let total = (img.width() * img.height()) as usize;
        assert!(keogram_pixels > total / 2, "{} of {}", keogram_pixels, total);

        // Past the outermost value axis is margin, not keogram.
        assert_ne!(*img.get_pixel(img.width() - 1, img.height() / 2), green);

        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("20250227_08-12_overlaid_partial_plot.png");
        plot.save(&out).unwrap();
        assert_eq!(image::open(&out).unwrap().to_rgb8().dimensions(), (3000, 1500));
    }
}

