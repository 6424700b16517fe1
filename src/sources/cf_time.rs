//! CF convention time units, `"<unit> since <epoch>"`.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::{dates::midnight, errors::KeoDataErr};

/// Decoded units of a CF time coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CfUnits {
    micros_per_unit: f64,
    epoch: NaiveDateTime,
}

const EPOCH_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn micros_per_unit(unit: &str) -> Option<f64> {
    let micros = match unit {
        "days" | "day" | "d" => 86_400.0e6,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0e6,
        "minutes" | "minute" | "mins" | "min" => 60.0e6,
        "seconds" | "second" | "secs" | "sec" | "s" => 1.0e6,
        "milliseconds" | "millisecond" | "msecs" | "msec" | "ms" => 1.0e3,
        "microseconds" | "microsecond" | "usecs" | "usec" | "us" => 1.0,
        _ => return None,
    };
    Some(micros)
}

fn parse_epoch(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let text = text
        .strip_suffix(" UTC")
        .or_else(|| text.strip_suffix("+00:00"))
        .or_else(|| text.strip_suffix('Z'))
        .unwrap_or(text)
        .trim();

    EPOCH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(midnight)
        })
}

impl FromStr for CfUnits {
    type Err = KeoDataErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeoDataErr::InvalidTimeUnits(s.to_owned());

        const SINCE: &str = " since ";
        let lower = s.to_ascii_lowercase();
        let split = lower.find(SINCE).ok_or_else(invalid)?;
        let unit = lower[..split].trim();
        let epoch = &s[split + SINCE.len()..];

        Ok(CfUnits {
            micros_per_unit: micros_per_unit(unit).ok_or_else(invalid)?,
            epoch: parse_epoch(epoch).ok_or_else(invalid)?,
        })
    }
}

impl CfUnits {
    /// The reference time values are counted from.
    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Convert a raw time value to a timestamp, `None` for values that are not representable.
    pub fn to_datetime(&self, value: f64) -> Option<NaiveDateTime> {
        let micros = (value * self.micros_per_unit).round();
        if !micros.is_finite() || micros.abs() > 1.0e17 {
            return None;
        }

        self.epoch
            .checked_add_signed(Duration::microseconds(micros as i64))
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_goes_style_units() {
        let units: CfUnits = "seconds since 2000-01-01 12:00:00".parse().unwrap();
        assert_eq!(units.epoch(), at(2000, 1, 1, 12, 0, 0));
        assert_eq!(units.to_datetime(86_400.0), Some(at(2000, 1, 2, 12, 0, 0)));
        assert_eq!(
            units.to_datetime(0.5),
            Some(at(2000, 1, 1, 12, 0, 0) + Duration::milliseconds(500))
        );
    }

    #[test]
    fn test_dscovr_style_units() {
        let units: CfUnits = "milliseconds since 1970-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(units.to_datetime(60_000.0), Some(at(1970, 1, 1, 0, 1, 0)));
    }

    #[test]
    fn test_other_units_and_epochs() {
        let units: CfUnits = "Days since 2025-02-27".parse().unwrap();
        assert_eq!(units.to_datetime(1.5), Some(at(2025, 2, 28, 12, 0, 0)));

        let units: CfUnits = "minutes since 2025-02-27 06:30 UTC".parse().unwrap();
        assert_eq!(units.to_datetime(30.0), Some(at(2025, 2, 27, 7, 0, 0)));

        let units: CfUnits = "hours since 2025-02-27T00:00:00.000".parse().unwrap();
        assert_eq!(units.to_datetime(25.0), Some(at(2025, 2, 28, 1, 0, 0)));

        let units: CfUnits = "microseconds since 2025-02-27 00:00:00".parse().unwrap();
        assert_eq!(units.to_datetime(1.0e6), Some(at(2025, 2, 27, 0, 0, 1)));
    }

    #[test]
    fn test_bad_units() {
        assert!("seconds".parse::<CfUnits>().is_err());
        assert!("fortnights since 2000-01-01".parse::<CfUnits>().is_err());
        assert!("seconds since yesterday".parse::<CfUnits>().is_err());

        let units: CfUnits = "seconds since 2000-01-01".parse().unwrap();
        assert_eq!(units.to_datetime(f64::NAN), None);
        assert_eq!(units.to_datetime(1.0e300), None);
    }
}
