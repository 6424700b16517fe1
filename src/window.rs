//! The span of a day that gets plotted, and how it maps onto image columns.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{dates::hours_since_midnight, errors::KeoDataErr};

/// A span of fractional hours UTC after midnight of a reference date. The end is exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    start_hour: f64,
    end_hour: f64,
    reference_date: NaiveDate,
}

impl TimeWindow {
    /// Create a new window, `0 <= start < end <= 24`.
    ///
    /// Windows crossing midnight are not supported.
    pub fn new(
        reference_date: NaiveDate,
        start_hour: f64,
        end_hour: f64,
    ) -> Result<Self, KeoDataErr> {
        let valid = start_hour.is_finite()
            && end_hour.is_finite()
            && start_hour >= 0.0
            && end_hour <= 24.0
            && end_hour > start_hour;

        if !valid {
            return Err(KeoDataErr::InvalidWindow(start_hour, end_hour));
        }

        Ok(TimeWindow {
            start_hour,
            end_hour,
            reference_date,
        })
    }

    /// The whole day, `[0, 24)`.
    pub fn full_day(reference_date: NaiveDate) -> Self {
        TimeWindow {
            start_hour: 0.0,
            end_hour: 24.0,
            reference_date,
        }
    }

    /// A window on whole hours, e.g. `(8, 12)` for 08:00 up to but not including 12:00.
    pub fn from_hours(
        reference_date: NaiveDate,
        first: u8,
        last_exclusive: u8,
    ) -> Result<Self, KeoDataErr> {
        Self::new(reference_date, f64::from(first), f64::from(last_exclusive))
    }

    /// First hour in the window.
    pub fn start_hour(&self) -> f64 {
        self.start_hour
    }

    /// End hour of the window, exclusive.
    pub fn end_hour(&self) -> f64 {
        self.end_hour
    }

    /// The day the hours count from.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Length of the window in hours.
    pub fn span(&self) -> f64 {
        self.end_hour - self.start_hour
    }

    /// Is this hour inside the window?
    pub fn contains(&self, hour: f64) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    /// Position of `time` on the hour axis of this window's reference date.
    pub fn hour_of(&self, time: NaiveDateTime) -> f64 {
        hours_since_midnight(time, self.reference_date)
    }

    /// Tick positions from the start to the end of the window, both included, every `step` hours.
    pub fn ticks(&self, step: f64) -> Vec<f64> {
        if !(step > 0.0) {
            return vec![self.start_hour, self.end_hour];
        }

        let count = ((self.span() + 1.0e-6) / step).floor() as usize;
        (0..=count)
            .map(|i| self.start_hour + i as f64 * step)
            .collect()
    }
}

/// Label an hour of the day as `HH:MM`.
pub fn format_hour(hour: f64) -> String {
    let total_minutes = (hour * 60.0).round() as i64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes.rem_euclid(60))
}

/// A range of pixel columns, `x0` included and `x1` excluded.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSpan {
    pub x0: u32,
    pub x1: u32,
}

impl ColumnSpan {
    /// Number of columns in the span.
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }
}

/// Columns of an image covering a whole day that hold the hours `[first_hour, last_hour)`.
///
/// Both ends are clamped to the image and the span is never empty for a non-empty image.
pub fn crop_columns(width: u32, first_hour: f64, last_hour: f64) -> ColumnSpan {
    crop_columns_within(width, (0.0, 24.0), first_hour, last_hour)
}

/// Like [`crop_columns`] for an image covering the hours `image_span` instead of a full day.
pub fn crop_columns_within(
    width: u32,
    image_span: (f64, f64),
    first_hour: f64,
    last_hour: f64,
) -> ColumnSpan {
    let (img_start, img_end) = image_span;
    let to_column = |hour: f64| -> u32 {
        let x = (f64::from(width) * (hour - img_start) / (img_end - img_start)).floor();
        if x <= 0.0 {
            0
        } else if x >= f64::from(width) {
            width
        } else {
            x as u32
        }
    };

    let mut x0 = to_column(first_hour);
    let mut x1 = to_column(last_hour);

    if x0 >= width {
        x0 = width.saturating_sub(1);
    }
    if x1 <= x0 {
        x1 = (x0 + 1).min(width);
    }

    ColumnSpan { x0, x1 }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 27).unwrap()
    }

    #[test]
    fn test_window_validation() {
        assert!(TimeWindow::new(day(), 8.0, 12.0).is_ok());
        assert!(TimeWindow::new(day(), 0.0, 24.0).is_ok());
        assert!(TimeWindow::new(day(), 12.0, 8.0).is_err());
        assert!(TimeWindow::new(day(), 8.0, 8.0).is_err());
        assert!(TimeWindow::new(day(), -1.0, 8.0).is_err());
        assert!(TimeWindow::new(day(), 22.0, 26.0).is_err());
        assert!(TimeWindow::new(day(), f64::NAN, 8.0).is_err());
    }

    #[test]
    fn test_contains_is_half_open() {
        let window = TimeWindow::from_hours(day(), 8, 12).unwrap();
        assert!(window.contains(8.0));
        assert!(window.contains(11.999));
        assert!(!window.contains(12.0));
        assert!(!window.contains(7.999));
    }

    #[test]
    fn test_ticks_and_labels() {
        let window = TimeWindow::from_hours(day(), 8, 12).unwrap();
        let ticks = window.ticks(0.5);
        assert_eq!(ticks.len(), 9);
        assert_eq!(ticks[0], 8.0);
        assert_eq!(ticks[8], 12.0);

        assert_eq!(window.ticks(1.0).len(), 5);
        assert_eq!(format_hour(8.25), "08:15");
        assert_eq!(format_hour(12.0), "12:00");
        assert_eq!(format_hour(23.5), "23:30");
    }

    #[test]
    fn test_crop_full_day_is_whole_image() {
        for width in &[1u32, 7, 240, 1441, 8640] {
            let span = crop_columns(*width, 0.0, 24.0);
            assert_eq!(span, ColumnSpan { x0: 0, x1: *width });
        }
    }

    #[test]
    fn test_crop_never_empty() {
        for width in &[1u32, 10, 24, 100, 1000] {
            for first in 0..24u32 {
                for last in (first + 1)..=24u32 {
                    let span = crop_columns(*width, f64::from(first), f64::from(last));
                    assert!(span.x1 > span.x0, "{} {} {}", width, first, last);
                    assert!(span.x1 <= *width);
                }
            }
        }
    }

    #[test]
    fn test_crop_columns_floor_and_collapse() {
        // 2400 px per day is 100 px per hour.
        assert_eq!(crop_columns(2400, 8.0, 12.0), ColumnSpan { x0: 800, x1: 1200 });

        // 10 px per day, one hour rounds to zero columns, so the span grows by one.
        let span = crop_columns(10, 5.0, 5.5);
        assert_eq!(span, ColumnSpan { x0: 2, x1: 3 });
    }

    #[test]
    fn test_crop_columns_within_partial_image() {
        // Image covers 08-12, 100 px per hour.
        let span = crop_columns_within(400, (8.0, 12.0), 9.0, 11.0);
        assert_eq!(span, ColumnSpan { x0: 100, x1: 300 });

        // Out of range hours are clamped.
        let span = crop_columns_within(400, (8.0, 12.0), 6.0, 14.0);
        assert_eq!(span, ColumnSpan { x0: 0, x1: 400 });
    }
}
