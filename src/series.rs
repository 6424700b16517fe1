//! Irregularly sampled measurements and their alignment onto the hour axis.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::window::TimeWindow;

/// An ordered series of measurements of one physical quantity.
///
/// Timestamps are strictly increasing and every value is finite. Samples that were missing in
/// the source are simply absent.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    name: String,
    times: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

/// How a series is bucketed before it is plotted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resampling {
    /// Plot the samples as they are.
    None,
    /// Mean over fixed width buckets.
    Fixed(Duration),
    /// Pick the bucket width from the density of the series, see [`Resampling::bucket_for`].
    Auto,
}

/// Ten second buckets, for dense series such as 10 Hz magnetometer data.
pub fn ten_seconds() -> Duration {
    Duration::seconds(10)
}

/// One minute buckets.
pub fn one_minute() -> Duration {
    Duration::minutes(1)
}

impl Resampling {
    /// The bucket width to use for `series`, if any.
    ///
    /// `Auto` uses 10 second buckets when samples come faster than once a second and one minute
    /// buckets otherwise.
    pub fn bucket_for(&self, series: &TimeSeries) -> Option<Duration> {
        match self {
            Resampling::None => None,
            Resampling::Fixed(bucket) => Some(*bucket),
            Resampling::Auto => match series.median_spacing() {
                Some(spacing) if spacing < Duration::seconds(1) => Some(ten_seconds()),
                Some(_) => Some(one_minute()),
                None => None,
            },
        }
    }
}

fn epoch() -> NaiveDateTime {
    crate::dates::midnight(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default())
}

fn micros_since_epoch(time: NaiveDateTime) -> i64 {
    (time - epoch()).num_microseconds().unwrap_or(i64::MAX)
}

impl TimeSeries {
    /// Build a series from samples in any order.
    ///
    /// Non-finite values are dropped, samples sharing a timestamp are averaged.
    pub fn new<S>(name: S, samples: impl IntoIterator<Item = (NaiveDateTime, f64)>) -> Self
    where
        S: Into<String>,
    {
        let mut samples: Vec<(NaiveDateTime, f64)> = samples
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .collect();
        samples.sort_by_key(|(t, _)| *t);

        let mut times: Vec<NaiveDateTime> = Vec::with_capacity(samples.len());
        let mut values: Vec<f64> = Vec::with_capacity(samples.len());
        let mut run = 0usize;

        for (t, v) in samples {
            if times.last() == Some(&t) {
                run += 1;
                if let Some(last) = values.last_mut() {
                    // running mean over the duplicates
                    *last += (v - *last) / run as f64;
                }
            } else {
                run = 1;
                times.push(t);
                values.push(v);
            }
        }

        TimeSeries {
            name: name.into(),
            times,
            values,
        }
    }

    /// Name of the measured quantity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample times, strictly increasing.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Sample values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(time, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Median time between consecutive samples.
    pub fn median_spacing(&self) -> Option<Duration> {
        let mut gaps: Vec<Duration> = self.times.windows(2).map(|w| w[1] - w[0]).collect();
        if gaps.is_empty() {
            return None;
        }
        gaps.sort();
        Some(gaps[gaps.len() / 2])
    }

    /// Mean over fixed width buckets aligned to the epoch, labelled by the bucket start.
    ///
    /// Buckets without samples are left out.
    pub fn resample(&self, bucket: Duration) -> TimeSeries {
        let width = match bucket.num_microseconds() {
            Some(w) if w > 0 => w,
            _ => return self.clone(),
        };

        let mut times = vec![];
        let mut values = vec![];
        let mut current: Option<(i64, f64, usize)> = None;

        let mut flush = |key: i64, sum: f64, count: usize| {
            times.push(epoch() + Duration::microseconds(key * width));
            values.push(sum / count as f64);
        };

        for (t, v) in self.iter() {
            let key = micros_since_epoch(t).div_euclid(width);
            current = match current {
                Some((k, sum, count)) if k == key => Some((k, sum + v, count + 1)),
                Some((k, sum, count)) => {
                    flush(k, sum, count);
                    Some((key, v, 1))
                }
                None => Some((key, v, 1)),
            };
        }
        if let Some((k, sum, count)) = current {
            flush(k, sum, count);
        }

        TimeSeries {
            name: self.name.clone(),
            times,
            values,
        }
    }

    /// Apply a resampling policy.
    pub fn resampled(&self, policy: Resampling) -> TimeSeries {
        match policy.bucket_for(self) {
            Some(bucket) => self.resample(bucket),
            None => self.clone(),
        }
    }

    /// Convert to hours since midnight of the window's date, keeping samples inside the window.
    pub fn align(&self, window: &TimeWindow) -> AlignedSeries {
        let (hours, values) = self
            .iter()
            .map(|(t, v)| (window.hour_of(t), v))
            .filter(|(h, _)| window.contains(*h))
            .unzip();

        AlignedSeries {
            name: self.name.clone(),
            hours,
            values,
        }
    }
}

/// A series on the hour axis of a [`TimeWindow`], ready to plot.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedSeries {
    name: String,
    hours: Vec<f64>,
    values: Vec<f64>,
}

impl AlignedSeries {
    /// Build directly from hours and values, pairs past the shorter list are ignored.
    pub fn from_parts<S: Into<String>>(name: S, hours: Vec<f64>, values: Vec<f64>) -> Self {
        let n = hours.len().min(values.len());
        let (mut hours, mut values) = (hours, values);
        hours.truncate(n);
        values.truncate(n);

        AlignedSeries {
            name: name.into(),
            hours,
            values,
        }
    }

    /// Name of the measured quantity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fractional hours since midnight.
    pub fn hours(&self) -> &[f64] {
        &self.hours
    }

    /// Values at each hour.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    /// True if nothing fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Keep only the points inside `window`. Filtering twice with the same window changes
    /// nothing.
    pub fn filter(&self, window: &TimeWindow) -> AlignedSeries {
        let (hours, values) = self
            .hours
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .filter(|(h, _)| window.contains(*h))
            .unzip();

        AlignedSeries {
            name: self.name.clone(),
            hours,
            values,
        }
    }

    /// Smallest and largest value, `None` for an empty series.
    pub fn extrema(&self) -> Option<(f64, f64)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Split into runs of points with no gap longer than `max_gap` hours between them.
    pub fn segments(&self, max_gap: f64) -> Vec<Vec<(f64, f64)>> {
        let mut segments: Vec<Vec<(f64, f64)>> = vec![];
        let mut last_hour: Option<f64> = None;

        for (&h, &v) in self.hours.iter().zip(self.values.iter()) {
            match (last_hour, segments.last_mut()) {
                (Some(prev), Some(segment)) if h - prev <= max_gap => segment.push((h, v)),
                _ => segments.push(vec![(h, v)]),
            }
            last_hour = Some(h);
        }

        segments
    }
}

/// Vertical axis range for a series: the floor, widened to include the observed extrema.
pub fn axis_limits(extrema: Option<(f64, f64)>, floor: (f64, f64)) -> (f64, f64) {
    match extrema {
        Some((lo, hi)) => (floor.0.min(lo), floor.1.max(hi)),
        None => floor,
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
