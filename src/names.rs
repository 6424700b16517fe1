//! File naming conventions used by the remote archives and by this crate's outputs.
//!
//! Every input convention has its own type that implements `FromStr` and `Display`. Parsing is
//! all or nothing, a name that does not follow the convention exactly is an
//! `UnrecognizedFileName` error. `Display` reproduces the name bit for bit.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::errors::KeoDataErr;

/// One hour of keogram as served by the AMISR archive.
///
/// `YYYYMMDD_HH_<site>_<camera>_rgb-keogram.png`
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HourlySliceName {
    pub date: NaiveDate,
    pub hour: u8,
    pub site: String,
    pub camera: String,
}

/// A full day keogram.
///
/// `YYYYMMDD__<site>_<camera>_full-keo-rgb.png`
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullDayName {
    pub date: NaiveDate,
    pub site: String,
    pub camera: String,
}

/// The two ways a keogram covering part of a day gets named.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialStyle {
    /// `YYYYMMDD__SS-EE_<site>_<camera>_partial-keo-rgb.png`
    Partial,
    /// `YYYYMMDD_SS-EE_<site>_<camera>_rgb-keogram_concat.png`
    Concat,
}

/// A keogram stitched together from a window of hours. The end hour is exclusive.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialName {
    pub date: NaiveDate,
    pub start_hour: u8,
    pub end_hour: u8,
    pub site: String,
    pub camera: String,
    pub style: PartialStyle,
}

/// GOES magnetometer L1b "flat" daily file.
///
/// `ops_mag-l1b-flat_<sat>_d<YYYYMMDD>_v<version>.nc`, optionally gzipped.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoesMagName {
    pub satellite: String,
    pub date: NaiveDate,
    pub version: String,
    pub compressed: bool,
}

/// DSCOVR solar wind daily file.
///
/// `<prefix>dscovr_s<YYYYMMDD><tail>_pub.nc.gz` where the tail usually carries the rest of the
/// start time and the end and production times.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DscovrName {
    pub prefix: String,
    pub date: NaiveDate,
    pub tail: String,
    pub compressed: bool,
}

/// A single all-sky camera frame at one wavelength, `<STATION>_YYYYMMDD_HHMMSS_<WAVE>.png`.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsiFrameName {
    pub station: String,
    pub time: NaiveDateTime,
    pub wavelength: String,
}

/// A month of full day keograms stacked on top of each other, `stacked_keograms_YYYYMM.png`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackedName {
    pub year: i32,
    pub month: u32,
}

/// Monthly quick-look Dst index file from the WDC for Geomagnetism, `dstYYMM.for.request`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DstFileName {
    pub year: i32,
    pub month: u32,
}

const HOURLY_SUFFIX: &str = "_rgb-keogram.png";
const FULL_DAY_SUFFIX: &str = "_full-keo-rgb.png";
const PARTIAL_SUFFIX: &str = "_partial-keo-rgb.png";
const CONCAT_SUFFIX: &str = "_rgb-keogram_concat.png";
const GOES_PREFIX: &str = "ops_mag-l1b-flat_";
const DSCOVR_MARK: &str = "dscovr_s";
const STACKED_PREFIX: &str = "stacked_keograms_";

fn unrecognized(name: &str) -> KeoDataErr {
    KeoDataErr::UnrecognizedFileName(name.to_owned())
}

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_ymd(s: &str) -> Option<NaiveDate> {
    if !all_digits(s, 8) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

fn parse_hour(s: &str) -> Option<u8> {
    if !all_digits(s, 2) {
        return None;
    }
    s.parse::<u8>().ok().filter(|h| *h <= 24)
}

fn parse_window(s: &str) -> Option<(u8, u8)> {
    let (start, end) = s.split_once('-')?;
    let (start, end) = (parse_hour(start)?, parse_hour(end)?);
    if end > start {
        Some((start, end))
    } else {
        None
    }
}

fn split_site_camera(s: &str) -> Option<(String, String)> {
    let (site, camera) = s.split_once('_')?;
    if site.is_empty() || camera.is_empty() {
        return None;
    }
    Some((site.to_owned(), camera.to_owned()))
}

/// Split the first `len` bytes off the front of `s` if they are there and ASCII.
fn split_front(s: &str, len: usize) -> Option<(&str, &str)> {
    if s.len() < len || !s.is_char_boundary(len) {
        return None;
    }
    Some(s.split_at(len))
}

/// The site code is the part of the station directory name before the first underscore,
/// `pfrr` for `pfrr_amisr01`.
pub fn site_of_station(station: &str) -> &str {
    station.split('_').next().unwrap_or(station)
}

impl FromStr for HourlySliceName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let body = name.strip_suffix(HOURLY_SUFFIX).ok_or_else(|| unrecognized(name))?;

        let mut parts = body.splitn(3, '_');
        let date = parts.next().and_then(parse_ymd);
        let hour = parts.next().and_then(parse_hour).filter(|h| *h < 24);
        let site_camera = parts.next().and_then(split_site_camera);

        match (date, hour, site_camera) {
            (Some(date), Some(hour), Some((site, camera))) => Ok(HourlySliceName {
                date,
                hour,
                site,
                camera,
            }),
            _ => Err(unrecognized(name)),
        }
    }
}

impl fmt::Display for HourlySliceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}_{:02}_{}_{}{}",
            self.date.format("%Y%m%d"),
            self.hour,
            self.site,
            self.camera,
            HOURLY_SUFFIX
        )
    }
}

impl FromStr for FullDayName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let body = name
            .strip_suffix(FULL_DAY_SUFFIX)
            .ok_or_else(|| unrecognized(name))?;

        let (date, rest) = body.split_once("__").ok_or_else(|| unrecognized(name))?;
        let date = parse_ymd(date).ok_or_else(|| unrecognized(name))?;
        let (site, camera) = split_site_camera(rest).ok_or_else(|| unrecognized(name))?;

        Ok(FullDayName { date, site, camera })
    }
}

impl fmt::Display for FullDayName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}__{}_{}{}",
            self.date.format("%Y%m%d"),
            self.site,
            self.camera,
            FULL_DAY_SUFFIX
        )
    }
}

impl FromStr for PartialName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (body, style, separator) = if let Some(body) = name.strip_suffix(PARTIAL_SUFFIX) {
            (body, PartialStyle::Partial, "__")
        } else if let Some(body) = name.strip_suffix(CONCAT_SUFFIX) {
            (body, PartialStyle::Concat, "_")
        } else {
            return Err(unrecognized(name));
        };

        let (date, rest) = split_front(body, 8).ok_or_else(|| unrecognized(name))?;
        let date = parse_ymd(date).ok_or_else(|| unrecognized(name))?;
        let rest = rest
            .strip_prefix(separator)
            .filter(|r| !r.starts_with('_'))
            .ok_or_else(|| unrecognized(name))?;

        let (window, site_camera) = rest.split_once('_').ok_or_else(|| unrecognized(name))?;
        let (start_hour, end_hour) = parse_window(window).ok_or_else(|| unrecognized(name))?;
        let (site, camera) = split_site_camera(site_camera).ok_or_else(|| unrecognized(name))?;

        Ok(PartialName {
            date,
            start_hour,
            end_hour,
            site,
            camera,
            style,
        })
    }
}

impl fmt::Display for PartialName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (separator, suffix) = match self.style {
            PartialStyle::Partial => ("__", PARTIAL_SUFFIX),
            PartialStyle::Concat => ("_", CONCAT_SUFFIX),
        };

        write!(
            f,
            "{}{}{:02}-{:02}_{}_{}{}",
            self.date.format("%Y%m%d"),
            separator,
            self.start_hour,
            self.end_hour,
            self.site,
            self.camera,
            suffix
        )
    }
}

impl FromStr for GoesMagName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let body = name.strip_prefix(GOES_PREFIX).ok_or_else(|| unrecognized(name))?;

        let (body, compressed) = if let Some(body) = body.strip_suffix(".nc.gz") {
            (body, true)
        } else if let Some(body) = body.strip_suffix(".nc") {
            (body, false)
        } else {
            return Err(unrecognized(name));
        };

        let (satellite, rest) = body.split_once("_d").ok_or_else(|| unrecognized(name))?;
        if !satellite.starts_with('g') || satellite.len() < 2 {
            return Err(unrecognized(name));
        }

        let (date, rest) = split_front(rest, 8).ok_or_else(|| unrecognized(name))?;
        let date = parse_ymd(date).ok_or_else(|| unrecognized(name))?;
        let version = rest
            .strip_prefix("_v")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| unrecognized(name))?;

        Ok(GoesMagName {
            satellite: satellite.to_owned(),
            date,
            version: version.to_owned(),
            compressed,
        })
    }
}

impl fmt::Display for GoesMagName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}_d{}_v{}.nc{}",
            GOES_PREFIX,
            self.satellite,
            self.date.format("%Y%m%d"),
            self.version,
            if self.compressed { ".gz" } else { "" }
        )
    }
}

impl FromStr for DscovrName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (body, compressed) = if let Some(body) = name.strip_suffix("_pub.nc.gz") {
            (body, true)
        } else if let Some(body) = name.strip_suffix("_pub.nc") {
            (body, false)
        } else {
            return Err(unrecognized(name));
        };

        let mark = body.find(DSCOVR_MARK).ok_or_else(|| unrecognized(name))?;
        let prefix = &body[..mark];
        let rest = &body[mark + DSCOVR_MARK.len()..];

        let (date, tail) = split_front(rest, 8).ok_or_else(|| unrecognized(name))?;
        let date = parse_ymd(date).ok_or_else(|| unrecognized(name))?;

        Ok(DscovrName {
            prefix: prefix.to_owned(),
            date,
            tail: tail.to_owned(),
            compressed,
        })
    }
}

impl fmt::Display for DscovrName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}_pub.nc{}",
            self.prefix,
            DSCOVR_MARK,
            self.date.format("%Y%m%d"),
            self.tail,
            if self.compressed { ".gz" } else { "" }
        )
    }
}

impl FromStr for AsiFrameName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lower = name.to_ascii_lowercase();
        if !lower.ends_with(".png") {
            return Err(unrecognized(name));
        }
        let body = &name[..name.len() - 4];

        let parts: Vec<&str> = body.split('_').collect();
        if parts.len() != 4 {
            return Err(unrecognized(name));
        }

        let station = parts[0];
        if station.is_empty() || !station.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(unrecognized(name));
        }

        if !all_digits(parts[1], 8) || !all_digits(parts[2], 6) || !all_digits(parts[3], 4) {
            return Err(unrecognized(name));
        }

        let stamp = format!("{}{}", parts[1], parts[2]);
        let time = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S")
            .map_err(|_| unrecognized(name))?;

        Ok(AsiFrameName {
            station: station.to_owned(),
            time,
            wavelength: parts[3].to_owned(),
        })
    }
}

impl fmt::Display for AsiFrameName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}.png",
            self.station,
            self.time.format("%Y%m%d_%H%M%S"),
            self.wavelength
        )
    }
}

impl StackedName {
    /// The stacked image name for the month `date` falls in.
    pub fn for_date(date: NaiveDate) -> Self {
        StackedName {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl FromStr for StackedName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let body = name
            .strip_prefix(STACKED_PREFIX)
            .and_then(|b| b.strip_suffix(".png"))
            .filter(|b| all_digits(b, 6))
            .ok_or_else(|| unrecognized(name))?;

        let year: i32 = body[..4].parse().map_err(|_| unrecognized(name))?;
        let month: u32 = body[4..].parse().map_err(|_| unrecognized(name))?;
        if !(1..=12).contains(&month) {
            return Err(unrecognized(name));
        }

        Ok(StackedName { year, month })
    }
}

impl fmt::Display for StackedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{:04}{:02}.png", STACKED_PREFIX, self.year, self.month)
    }
}

impl FromStr for DstFileName {
    type Err = KeoDataErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let body = name
            .strip_prefix("dst")
            .and_then(|b| b.strip_suffix(".for.request"))
            .filter(|b| all_digits(b, 4))
            .ok_or_else(|| unrecognized(name))?;

        let year: i32 = body[..2].parse().map_err(|_| unrecognized(name))?;
        let month: u32 = body[2..].parse().map_err(|_| unrecognized(name))?;
        if !(1..=12).contains(&month) {
            return Err(unrecognized(name));
        }

        Ok(DstFileName {
            year: 2000 + year,
            month,
        })
    }
}

impl fmt::Display for DstFileName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "dst{:02}{:02}.for.request",
            self.year.rem_euclid(100),
            self.month
        )
    }
}

/// Output name of an overlay plot. With a window the name marks it as a partial plot.
pub fn overlay_file_name(date: NaiveDate, window: Option<(u8, u8)>) -> String {
    match window {
        None => format!("{}_overlaid_plot.png", date.format("%Y%m%d")),
        Some((start, end)) => format!(
            "{}_{:02}-{:02}_overlaid_partial_plot.png",
            date.format("%Y%m%d"),
            start,
            end
        ),
    }
}

/// Output name of an RGB composite built around the frame at `time`.
pub fn composite_file_name(station: &str, time: NaiveDateTime) -> String {
    format!(
        "{}_{}_RGB_composite.png",
        station.to_uppercase(),
        time.format("%Y%m%d_%H%M%S")
    )
}

/// Output names of the vertical Dst strip and of the strip joined to the stacked keogram.
pub fn dst_strip_file_names(year: i32, month: u32) -> (String, String) {
    (
        format!("dst_{:04}{:02}_vertical.png", year, month),
        format!("keogram_plus_dst_{:04}{:02}.png", year, month),
    )
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_hourly_slice_name() {
        let name = "20251125_01_pfrr_asi3_rgb-keogram.png";
        let parsed: HourlySliceName = name.parse().unwrap();

        assert_eq!(parsed.date, ymd(2025, 11, 25));
        assert_eq!(parsed.hour, 1);
        assert_eq!(parsed.site, "pfrr");
        assert_eq!(parsed.camera, "asi3");
        assert_eq!(parsed.to_string(), name);

        assert!("20251125_1_pfrr_asi3_rgb-keogram.png"
            .parse::<HourlySliceName>()
            .is_err());
        assert!("20251125_24_pfrr_asi3_rgb-keogram.png"
            .parse::<HourlySliceName>()
            .is_err());
        assert!("20251125_01_pfrr_rgb-keogram.png"
            .parse::<HourlySliceName>()
            .is_err());
        assert!("20251125_01_pfrr_asi3_rgb-keogram.jpg"
            .parse::<HourlySliceName>()
            .is_err());
    }

    #[test]
    fn test_full_day_name() {
        let name = "20250301__pfrr_asi3_full-keo-rgb.png";
        let parsed: FullDayName = name.parse().unwrap();

        assert_eq!(parsed.date, ymd(2025, 3, 1));
        assert_eq!(parsed.site, "pfrr");
        assert_eq!(parsed.camera, "asi3");
        assert_eq!(parsed.to_string(), name);

        assert!("20250301_pfrr_asi3_full-keo-rgb.png"
            .parse::<FullDayName>()
            .is_err());
        assert!("2025030__pfrr_asi3_full-keo-rgb.png"
            .parse::<FullDayName>()
            .is_err());
    }

    #[test]
    fn test_partial_names() {
        let name = "20250227__08-12_pfrr_asi3_partial-keo-rgb.png";
        let parsed: PartialName = name.parse().unwrap();
        assert_eq!(parsed.date, ymd(2025, 2, 27));
        assert_eq!((parsed.start_hour, parsed.end_hour), (8, 12));
        assert_eq!(parsed.style, PartialStyle::Partial);
        assert_eq!(parsed.to_string(), name);

        let name = "20251125_01-18_pfrr_asi3_rgb-keogram_concat.png";
        let parsed: PartialName = name.parse().unwrap();
        assert_eq!((parsed.start_hour, parsed.end_hour), (1, 18));
        assert_eq!(parsed.style, PartialStyle::Concat);
        assert_eq!(parsed.to_string(), name);

        // Separators belong to the style.
        assert!("20250227_08-12_pfrr_asi3_partial-keo-rgb.png"
            .parse::<PartialName>()
            .is_err());
        assert!("20250227__08-12_pfrr_asi3_rgb-keogram_concat.png"
            .parse::<PartialName>()
            .is_err());
        // Reversed or empty windows.
        assert!("20250227__12-08_pfrr_asi3_partial-keo-rgb.png"
            .parse::<PartialName>()
            .is_err());
        assert!("20250227__08-08_pfrr_asi3_partial-keo-rgb.png"
            .parse::<PartialName>()
            .is_err());
        // The old stitched name without a window is not a partial name.
        assert!("20250227__pfrr_asi3_partial-keo-rgb.png"
            .parse::<PartialName>()
            .is_err());
    }

    #[test]
    fn test_goes_name() {
        let name = "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc";
        let parsed: GoesMagName = name.parse().unwrap();
        assert_eq!(parsed.satellite, "g18");
        assert_eq!(parsed.date, ymd(2025, 2, 27));
        assert_eq!(parsed.version, "0-0-0");
        assert!(!parsed.compressed);
        assert_eq!(parsed.to_string(), name);

        let gz: GoesMagName = "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc.gz"
            .parse()
            .unwrap();
        assert!(gz.compressed);

        assert!("ops_mag-l1b-flat_g18_d20250227.nc"
            .parse::<GoesMagName>()
            .is_err());
        assert!("ops_mag-l1b-flat_x18_d20250227_v0-0-0.nc"
            .parse::<GoesMagName>()
            .is_err());
    }

    #[test]
    fn test_dscovr_name() {
        let name = "oe_m1m_dscovr_s20250227000000_e20250227235959_p20250228022028_pub.nc.gz";
        let parsed: DscovrName = name.parse().unwrap();
        assert_eq!(parsed.prefix, "oe_m1m_");
        assert_eq!(parsed.date, ymd(2025, 2, 27));
        assert_eq!(parsed.tail, "000000_e20250227235959_p20250228022028");
        assert!(parsed.compressed);
        assert_eq!(parsed.to_string(), name);

        assert!("oe_m1m_dscovr_s20250227000000_pub.txt"
            .parse::<DscovrName>()
            .is_err());
        assert!("oe_m1m_ace_s20250227000000_pub.nc"
            .parse::<DscovrName>()
            .is_err());
    }

    #[test]
    fn test_asi_frame_name() {
        let parsed: AsiFrameName = "PFRR_20251103_021226_0630.png".parse().unwrap();
        assert_eq!(parsed.station, "PFRR");
        assert_eq!(parsed.wavelength, "0630");
        assert_eq!(
            parsed.time,
            ymd(2025, 11, 3).and_hms_opt(2, 12, 26).unwrap()
        );
        assert_eq!(parsed.to_string(), "PFRR_20251103_021226_0630.png");

        let lower: AsiFrameName = "pfrr_20251103_021226_0558.PNG".parse().unwrap();
        assert_eq!(lower.wavelength, "0558");

        assert!("PFRR_20251103_021226_0630_RGB_composite.png"
            .parse::<AsiFrameName>()
            .is_err());
        assert!("PFRR_20251103_251226_0630.png"
            .parse::<AsiFrameName>()
            .is_err());
    }

    #[test]
    fn test_stacked_and_dst_names() {
        let stacked = StackedName::for_date(ymd(2025, 3, 14));
        assert_eq!(stacked.to_string(), "stacked_keograms_202503.png");
        assert_eq!(
            "stacked_keograms_202503.png".parse::<StackedName>().unwrap(),
            stacked
        );
        assert!("stacked_keograms_202513.png".parse::<StackedName>().is_err());

        let dst: DstFileName = "dst2503.for.request".parse().unwrap();
        assert_eq!((dst.year, dst.month), (2025, 3));
        assert_eq!(dst.to_string(), "dst2503.for.request");
    }

    #[test]
    fn test_output_names() {
        let date = ymd(2025, 2, 27);
        assert_eq!(overlay_file_name(date, None), "20250227_overlaid_plot.png");
        assert_eq!(
            overlay_file_name(date, Some((8, 12))),
            "20250227_08-12_overlaid_partial_plot.png"
        );

        let time = date.and_hms_opt(2, 12, 26).unwrap();
        assert_eq!(
            composite_file_name("pfrr", time),
            "PFRR_20250227_021226_RGB_composite.png"
        );

        assert_eq!(site_of_station("pfrr_amisr01"), "pfrr");
        assert_eq!(site_of_station("pkr"), "pkr");
    }
}
