//! Finding files in the archive by the naming conventions in [`crate::names`].

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use log::debug;

use super::{Archive, Collection};

use crate::names::{DscovrName, FullDayName, GoesMagName, HourlySliceName, PartialName};

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Regular files directly inside `dir`, sorted. A missing directory has no files.
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|de| de.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(_) => vec![],
    };
    files.sort();
    files
}

/// Regular files anywhere below `dir`, sorted by path. Linked directories are not followed.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = vec![];
    let mut pending = vec![dir.to_path_buf()];

    while let Some(next) = pending.pop() {
        let entries = match std::fs::read_dir(&next) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.filter_map(Result::ok) {
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(_) => continue,
            };
            let path = entry.path();

            // Symlinked directories are not descended into, they may loop.
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(path);
            } else if file_type.is_symlink() {
                debug!("Not following linked directory {}", path.display());
            }
        }
    }

    files.sort();
    files
}

/// Hourly keogram slices directly inside `dir`, grouped by date and sorted by hour.
pub fn hourly_slices(dir: &Path) -> BTreeMap<NaiveDate, Vec<(HourlySliceName, PathBuf)>> {
    let mut groups: BTreeMap<NaiveDate, Vec<(HourlySliceName, PathBuf)>> = BTreeMap::new();

    for path in files_in(dir) {
        let name = match file_name(&path) {
            Some(name) if name.ends_with(".png") => name,
            _ => continue,
        };

        match name.parse::<HourlySliceName>() {
            Ok(parsed) => groups.entry(parsed.date).or_default().push((parsed, path)),
            Err(_) => debug!("Skipping unrecognized file: {}", name),
        }
    }

    for slices in groups.values_mut() {
        slices.sort_by_key(|(name, _)| name.hour);
    }

    groups
}

/// Full day keograms anywhere below `dir`, grouped by (year, month) and sorted by date.
pub fn full_day_keograms(dir: &Path) -> BTreeMap<(i32, u32), Vec<(NaiveDate, PathBuf)>> {
    let mut groups: BTreeMap<(i32, u32), Vec<(NaiveDate, PathBuf)>> = BTreeMap::new();

    for path in files_under(dir) {
        if let Some(parsed) = file_name(&path).and_then(|n| n.parse::<FullDayName>().ok()) {
            groups
                .entry((parsed.date.year(), parsed.date.month()))
                .or_default()
                .push((parsed.date, path));
        }
    }

    for days in groups.values_mut() {
        days.sort();
    }

    groups
}

impl Archive {
    /// Find a file for `date` in a collection.
    ///
    /// The `YYYY/MM` directory of the date is searched first, then the whole collection. The
    /// first match in path order wins.
    pub fn find_file<P>(&self, collection: Collection, date: NaiveDate, pred: P) -> Option<PathBuf>
    where
        P: Fn(&str) -> bool,
    {
        let matches = |path: &PathBuf| file_name(path).map(&pred).unwrap_or(false);

        files_in(&self.month_dir(collection, date))
            .into_iter()
            .find(matches)
            .or_else(|| {
                files_under(&self.collection_dir(collection))
                    .into_iter()
                    .find(matches)
            })
    }

    /// The full day keogram for `date`.
    ///
    /// A properly named file is preferred, any png with the date and "keo" in its name will do.
    pub fn full_keogram(&self, date: NaiveDate) -> Option<PathBuf> {
        let ymd = date.format("%Y%m%d").to_string();

        self.find_file(Collection::FullKeograms, date, |name| {
            name.parse::<FullDayName>()
                .map(|parsed| parsed.date == date)
                .unwrap_or(false)
        })
        .or_else(|| {
            self.find_file(Collection::FullKeograms, date, |name| {
                name.contains(&ymd) && name.contains("keo") && name.ends_with(".png")
            })
        })
    }

    /// A keogram stitched from a window of hours on `date`, with its parsed name.
    pub fn partial_keogram(&self, date: NaiveDate) -> Option<(PathBuf, PartialName)> {
        let path = self.find_file(Collection::PartialKeograms, date, |name| {
            name.parse::<PartialName>()
                .map(|parsed| parsed.date == date)
                .unwrap_or(false)
        })?;

        let parsed = file_name(&path)?.parse::<PartialName>().ok()?;
        Some((path, parsed))
    }

    /// The GOES magnetometer file for `date`.
    pub fn goes_file(&self, date: NaiveDate) -> Option<PathBuf> {
        self.find_file(Collection::Goes, date, |name| {
            name.parse::<GoesMagName>()
                .map(|parsed| parsed.date == date)
                .unwrap_or(false)
        })
    }

    /// The DSCOVR solar wind file for `date`, gzipped files are preferred.
    pub fn dscovr_file(&self, date: NaiveDate) -> Option<PathBuf> {
        let matching = |compressed: bool| {
            move |name: &str| {
                name.parse::<DscovrName>()
                    .map(|parsed| parsed.date == date && parsed.compressed == compressed)
                    .unwrap_or(false)
            }
        };

        self.find_file(Collection::Dscovr, date, matching(true))
            .or_else(|| self.find_file(Collection::Dscovr, date, matching(false)))
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use std::fs::{create_dir_all, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_dir_searched_first() {
        let tmp = TempDir::new().unwrap();
        let arch = Archive::create(&tmp.path()).unwrap();
        let date = ymd(2025, 2, 27);
        let name = "ops_mag-l1b-flat_g18_d20250227_v0-0-0.nc";

        let stray = arch.collection_dir(Collection::Goes).join("aaa").join(name);
        let proper = arch.month_dir(Collection::Goes, date).join(name);
        touch(&stray);
        touch(&proper);

        assert_eq!(arch.goes_file(date), Some(proper.clone()));

        std::fs::remove_file(&proper).unwrap();
        assert_eq!(arch.goes_file(date), Some(stray));
        assert_eq!(arch.goes_file(ymd(2025, 2, 28)), None);
    }

    #[test]
    fn test_full_keogram_prefers_convention() {
        let tmp = TempDir::new().unwrap();
        let arch = Archive::create(&tmp.path()).unwrap();
        let date = ymd(2025, 3, 1);
        let dir = arch.month_dir(Collection::FullKeograms, date);

        let loose = dir.join("20250301_keo_quicklook.png");
        touch(&loose);
        assert_eq!(arch.full_keogram(date), Some(loose));

        let proper = dir.join("20250301__pfrr_asi3_full-keo-rgb.png");
        touch(&proper);
        assert_eq!(arch.full_keogram(date), Some(proper));
    }

    #[test]
    fn test_partial_and_dscovr_locators() {
        let tmp = TempDir::new().unwrap();
        let arch = Archive::create(&tmp.path()).unwrap();
        let date = ymd(2025, 2, 27);

        let partial = arch
            .month_dir(Collection::PartialKeograms, date)
            .join("20250227_08-12_pfrr_asi3_rgb-keogram_concat.png");
        touch(&partial);
        let (path, name) = arch.partial_keogram(date).unwrap();
        assert_eq!(path, partial);
        assert_eq!((name.start_hour, name.end_hour), (8, 12));

        let dir = arch.month_dir(Collection::Dscovr, date);
        let plain =
            dir.join("oe_m1m_dscovr_s20250227000000_e20250227235959_p20250228022028_pub.nc");
        touch(&plain);
        assert_eq!(arch.dscovr_file(date), Some(plain));
        let gz =
            dir.join("oe_m1m_dscovr_s20250227000000_e20250227235959_p20250228022028_pub.nc.gz");
        touch(&gz);
        assert_eq!(arch.dscovr_file(date), Some(gz));
    }

    #[test]
    fn test_hourly_slices_grouped_and_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in &[
            "20251125_10_pfrr_asi3_rgb-keogram.png",
            "20251125_02_pfrr_asi3_rgb-keogram.png",
            "20251126_05_pfrr_asi3_rgb-keogram.png",
            "20251125__pfrr_asi3_full-keo-rgb.png",
            "notes.txt",
        ] {
            touch(&tmp.path().join(name));
        }

        let groups = hourly_slices(tmp.path());
        assert_eq!(groups.len(), 2);
        let hours: Vec<u8> = groups[&ymd(2025, 11, 25)].iter().map(|(n, _)| n.hour).collect();
        assert_eq!(hours, vec![2, 10]);
    }

    #[test]
    fn test_full_day_keograms_by_month() {
        let tmp = TempDir::new().unwrap();
        for name in &[
            "2025/03/20250302__pfrr_asi3_full-keo-rgb.png",
            "2025/03/20250301__pfrr_asi3_full-keo-rgb.png",
            "2025/04/20250401__pfrr_asi3_full-keo-rgb.png",
            "2025/04/stacked_keograms_202504.png",
        ] {
            touch(&tmp.path().join(name));
        }

        let groups = full_day_keograms(tmp.path());
        assert_eq!(groups.len(), 2);
        let march: Vec<NaiveDate> = groups[&(2025, 3)].iter().map(|(d, _)| *d).collect();
        assert_eq!(march, vec![ymd(2025, 3, 1), ymd(2025, 3, 2)]);
        assert_eq!(groups[&(2025, 4)].len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_files_under_skips_linked_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("2025").join("02").join("a.png"));
        touch(&root.join("top.png"));

        std::os::unix::fs::symlink(root, root.join("2025").join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("top.png"), root.join("link.png")).unwrap();

        let files = files_under(root);
        assert_eq!(
            files,
            vec![
                root.join("2025").join("02").join("a.png"),
                root.join("link.png"),
                root.join("top.png"),
            ]
        );
    }
}

