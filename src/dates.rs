//! Calendar days and the hour-of-day axis everything is plotted on.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::KeoDataErr;

/// Parse a date given as `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_date_any(input: &str) -> Result<NaiveDate, KeoDataErr> {
    let input = input.trim();

    let fmt = if input.len() == 8 && input.bytes().all(|b| b.is_ascii_digit()) {
        "%Y%m%d"
    } else {
        "%Y-%m-%d"
    };

    NaiveDate::parse_from_str(input, fmt).map_err(|_| KeoDataErr::InvalidDate(input.to_owned()))
}

/// Midnight UTC at the start of `date`.
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Fractional hours elapsed between midnight of `date` and `time`.
///
/// Times before midnight are negative, times on the next day are over 24.
pub fn hours_since_midnight(time: NaiveDateTime, date: NaiveDate) -> f64 {
    let delta = time - midnight(date);

    // Microsecond resolution, the data never gets finer than 10 Hz.
    match delta.num_microseconds() {
        Some(us) => us as f64 / 3_600_000_000.0,
        None => delta.num_seconds() as f64 / 3600.0,
    }
}

/// An inclusive range of days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, the end must not come before the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, KeoDataErr> {
        if end < start {
            return Err(KeoDataErr::InvalidDate(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }

        Ok(DateRange { start, end })
    }

    /// A range covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    /// First day in the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day in the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Iterate over every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let steps = (self.end - self.start).num_days();

        (0..=steps).map(move |step| start + Duration::days(step))
    }

    /// Group the days by (year, month), months in order.
    pub fn by_month(&self) -> Vec<((i32, u32), Vec<NaiveDate>)> {
        let mut groups: Vec<((i32, u32), Vec<NaiveDate>)> = vec![];

        for day in self.days() {
            let key = (day.year(), day.month());
            match groups.last_mut() {
                Some((last_key, days)) if *last_key == key => days.push(day),
                _ => groups.push((key, vec![day])),
            }
        }

        groups
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
