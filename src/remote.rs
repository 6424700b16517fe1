//! The remote archives keograms and magnetometer data are downloaded from.

use chrono::{Datelike, NaiveDate};

use crate::names::{site_of_station, FullDayName, GoesMagName, HourlySliceName};

mod fetch;
mod index;

pub use fetch::{check_status, Fetcher, BROWSER_UA};
pub use index::{extract_hrefs, last_component, scrape_hours, time_bounds};

/// The AMISR optics archive of processed all-sky camera products.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmisrArchive {
    base: String,
    station: String,
    camera: String,
}

impl Default for AmisrArchive {
    fn default() -> Self {
        AmisrArchive {
            base: Self::BASE.to_owned(),
            station: "pfrr_amisr01".to_owned(),
            camera: "asi3".to_owned(),
        }
    }
}

impl AmisrArchive {
    const BASE: &'static str =
        "https://optics.gi.alaska.edu/amisr_archive/Processed_data/aurorax/stream2/";

    /// The default archive with a different station and camera.
    pub fn new(station: &str, camera: &str) -> Self {
        AmisrArchive {
            station: station.to_owned(),
            camera: camera.to_owned(),
            ..Self::default()
        }
    }

    /// Point at a different server or mirror. A trailing slash is added if missing.
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = if base.ends_with('/') {
            base.to_owned()
        } else {
            format!("{}/", base)
        };
        self
    }

    /// Station directory name, e.g. `pfrr_amisr01`.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Camera code, e.g. `asi3`.
    pub fn camera(&self) -> &str {
        &self.camera
    }

    /// Site code used in file names, e.g. `pfrr`.
    pub fn site(&self) -> &str {
        site_of_station(&self.station)
    }

    /// Directory listing the `utHH/` hour directories of a day.
    pub fn day_url(&self, date: NaiveDate) -> String {
        format!(
            "{}{:04}/{:02}/{:02}/{}/",
            self.base,
            date.year(),
            date.month(),
            date.day(),
            self.station
        )
    }

    /// Directory of one hour of a day.
    pub fn hour_url(&self, date: NaiveDate, hour: u8) -> String {
        format!("{}ut{:02}/", self.day_url(date), hour)
    }

    /// Name of the full day keogram for a date.
    pub fn full_keogram_name(&self, date: NaiveDate) -> String {
        FullDayName {
            date,
            site: self.site().to_owned(),
            camera: self.camera.clone(),
        }
        .to_string()
    }

    /// Where the full day keogram for a date lives.
    pub fn full_keogram_url(&self, date: NaiveDate) -> String {
        format!("{}{}", self.day_url(date), self.full_keogram_name(date))
    }

    /// Name of the hourly keogram slice for a date and hour.
    pub fn hourly_slice_name(&self, date: NaiveDate, hour: u8) -> String {
        HourlySliceName {
            date,
            hour,
            site: self.site().to_owned(),
            camera: self.camera.clone(),
        }
        .to_string()
    }

    /// Pick the RGB keogram slice out of an hour directory listing.
    ///
    /// The exact expected name wins, otherwise the first name in sorted order matching it case
    /// insensitively, with or without a zero padded hour.
    pub fn pick_hour_file(&self, hrefs: &[String], date: NaiveDate, hour: u8) -> Option<String> {
        let exact = self.hourly_slice_name(date, hour);
        let names: Vec<&str> = hrefs.iter().map(|h| last_component(h)).collect();

        if names.iter().any(|n| *n == exact) {
            return Some(exact);
        }

        let padded = exact.to_ascii_lowercase();
        let unpadded = format!(
            "{}_{}_{}_{}_rgb-keogram.png",
            date.format("%Y%m%d"),
            hour,
            self.site(),
            self.camera
        )
        .to_ascii_lowercase();

        let mut candidates: Vec<&str> = names
            .into_iter()
            .filter(|n| {
                let lower = n.to_ascii_lowercase();
                lower == padded || lower == unpadded
            })
            .collect();
        candidates.sort_unstable();

        candidates.first().map(|n| (*n).to_owned())
    }
}

/// NOAA NCEI archive of GOES L1b magnetometer files, one directory per month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoesArchive {
    base: String,
    satellite: String,
}

impl Default for GoesArchive {
    fn default() -> Self {
        GoesArchive {
            base: Self::BASE.to_owned(),
            satellite: "g18".to_owned(),
        }
    }
}

impl GoesArchive {
    const BASE: &'static str = concat!(
        "https://data.ngdc.noaa.gov/platforms/solar-space-observing-satellites/",
        "goes/goes18/l1b/mag-l1b-flat/"
    );

    /// Index page for a month.
    pub fn month_url(&self, year: i32, month: u32) -> String {
        format!("{}{:04}/{:02}/", self.base, year, month)
    }

    /// URL of a file listed in the index of the month `date` falls in.
    pub fn file_url(&self, date: NaiveDate, name: &str) -> String {
        format!("{}{}", self.month_url(date.year(), date.month()), name)
    }

    /// Names in a month index that hold data for `date`, compressed or not.
    pub fn files_for_day(&self, hrefs: &[String], date: NaiveDate) -> Vec<String> {
        let mut files: Vec<String> = hrefs
            .iter()
            .filter(|h| !h.ends_with('/') && !h.contains('?') && !h.contains('#'))
            .map(|h| last_component(h))
            .filter(|name| {
                name.parse::<GoesMagName>()
                    .map(|parsed| parsed.date == date && parsed.satellite == self.satellite)
                    .unwrap_or(false)
            })
            .map(str::to_owned)
            .collect();

        files.sort();
        files.dedup();
        files
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 25).unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_amisr_urls() {
        let arch = AmisrArchive::default();
        assert_eq!(
            arch.day_url(day()),
            concat!(
                "https://optics.gi.alaska.edu/amisr_archive/Processed_data/aurorax/stream2/",
                "2025/11/25/pfrr_amisr01/"
            )
        );
        assert!(arch.hour_url(day(), 3).ends_with("/pfrr_amisr01/ut03/"));
        assert!(arch
            .full_keogram_url(day())
            .ends_with("/2025/11/25/pfrr_amisr01/20251125__pfrr_asi3_full-keo-rgb.png"));

        let mirror = AmisrArchive::new("gako_amisr02", "asi1").with_base("http://localhost:8000");
        assert_eq!(mirror.site(), "gako");
        assert_eq!(
            mirror.day_url(day()),
            "http://localhost:8000/2025/11/25/gako_amisr02/"
        );
    }

    #[test]
    fn test_pick_hour_file() {
        let arch = AmisrArchive::default();

        let hrefs = strings(&[
            "../",
            "20251125_01_pfrr_asi3_green-keogram.png",
            "20251125_01_pfrr_asi3_rgb-keogram.png",
        ]);
        assert_eq!(
            arch.pick_hour_file(&hrefs, day(), 1).as_deref(),
            Some("20251125_01_pfrr_asi3_rgb-keogram.png")
        );

        let hrefs = strings(&["20251125_1_PFRR_ASI3_RGB-KEOGRAM.png"]);
        assert_eq!(
            arch.pick_hour_file(&hrefs, day(), 1).as_deref(),
            Some("20251125_1_PFRR_ASI3_RGB-KEOGRAM.png")
        );

        let hrefs = strings(&["20251125_01_pfrr_asi3_green-keogram.png"]);
        assert_eq!(arch.pick_hour_file(&hrefs, day(), 1), None);
    }

    #[test]
    fn test_goes_files_for_day() {
        let goes = GoesArchive::default();
        assert!(goes.month_url(2025, 2).ends_with("/mag-l1b-flat/2025/02/"));

        let date = NaiveDate::from_ymd_opt(2025, 2, 27).unwrap();
        let hrefs = strings(&[
            "?C=N;O=D",
            "../",
            "ops_mag-l1b-flat_g18_d20250226_v0-0-0.nc",
            "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc",
            "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc.gz",
            "ops_mag-l1b-flat_g17_d20250227_v0-0-0.nc",
        ]);

        assert_eq!(
            goes.files_for_day(&hrefs, date),
            strings(&[
                "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc",
                "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc.gz",
            ])
        );
        assert!(goes
            .file_url(date, "x.nc")
            .ends_with("/mag-l1b-flat/2025/02/x.nc"));
    }
}
