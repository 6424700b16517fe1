//! World Data Center quick-look Dst files, one `DST2` record per day.

use std::path::Path;

use chrono::NaiveDate;
use log::warn;

use crate::{errors::KeoDataErr, names::DstFileName, series::TimeSeries};

/// Value used in the records for a missing hour.
const MISSING: i32 = 9999;

/// The base value and 24 hourly values as four character columns starting at column 16.
///
/// Adjacent wide values such as `9999` run together, so columns are tried before whitespace.
fn fixed_width_fields(line: &str) -> Option<Vec<i32>> {
    (0..25)
        .map(|i| {
            let start = 16 + 4 * i;
            line.get(start..start + 4)?.trim().parse::<i32>().ok()
        })
        .collect()
}

fn whitespace_fields(line: &str) -> Option<Vec<i32>> {
    let nums: Vec<i32> = line
        .get(16..)?
        .split_whitespace()
        .map(|n| n.parse::<i32>())
        .collect::<Result<_, _>>()
        .ok()?;

    if nums.len() >= 25 {
        Some(nums)
    } else {
        None
    }
}

/// Parse the hourly Dst values for `year`/`month` from the text of a quick-look file.
///
/// Lines not starting with `DST2` are skipped. The day is in columns 9-10, and after column 16
/// come a base value and the 24 hourly values. Hours holding 9999 are missing and left out.
pub fn parse_dst_quicklook(text: &str, year: i32, month: u32) -> Result<TimeSeries, KeoDataErr> {
    let mut samples = vec![];

    for line in text.lines().filter(|line| line.starts_with("DST2")) {
        let day = match line.get(8..10).and_then(|d| d.trim().parse::<u32>().ok()) {
            Some(day) => day,
            None => {
                warn!("Skipping Dst record without a day: {}", line);
                continue;
            }
        };

        let date = match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => date,
            None => {
                warn!("Skipping Dst record for invalid day {}-{:02}-{:02}", year, month, day);
                continue;
            }
        };

        let nums = match fixed_width_fields(line).or_else(|| whitespace_fields(line)) {
            Some(nums) => nums,
            None => {
                warn!("Skipping malformed Dst record: {}", line);
                continue;
            }
        };

        for (hour, &value) in nums[1..25].iter().enumerate() {
            if value == MISSING {
                continue;
            }
            if let Some(time) = date.and_hms_opt(hour as u32, 0, 0) {
                samples.push((time, f64::from(value)));
            }
        }
    }

    if samples.is_empty() {
        return Err(KeoDataErr::NotEnoughData);
    }

    Ok(TimeSeries::new("Dst", samples))
}

/// Read a quick-look file named `dstYYMM.for.request`, taking the month from the file name.
pub fn read_dst_file(path: &Path) -> Result<TimeSeries, KeoDataErr> {
    let name: DstFileName = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| KeoDataErr::UnrecognizedFileName(path.display().to_string()))?
        .parse()?;

    let text = std::fs::read_to_string(path)?;
    parse_dst_quicklook(&text, name.year, name.month)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn record(day: u32, hourly: &[i32]) -> String {
        let mut line = format!("DST2503*{:02}RRX020", day);
        line.push_str(&format!("{:4}", 0));
        for v in hourly {
            line.push_str(&format!("{:4}", v));
        }
        line.push_str(&format!("{:4}", -10));
        line
    }

    #[test]
    fn test_parse_records() {
        let day1: Vec<i32> = (0..24).map(|h| -h).collect();
        let mut day2: Vec<i32> = vec![5; 24];
        day2[3] = MISSING;

        let text = format!(
            "{}\n{}\nfooter line\n\n",
            record(1, &day1),
            record(2, &day2)
        );

        let series = parse_dst_quicklook(&text, 2025, 3).unwrap();
        assert_eq!(series.len(), 47);

        let start = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(series.times()[0], start);
        assert_eq!(series.values()[5], -5.0);
        assert_eq!(series.values()[23], -23.0);
        assert_eq!(series.values()[24], 5.0);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let text = format!("DST2503*xx\nDST2503*05RRX020   1   2\n{}", record(6, &[1; 24]));
        let series = parse_dst_quicklook(&text, 2025, 3).unwrap();
        assert_eq!(series.len(), 24);

        assert!(parse_dst_quicklook("nothing here", 2025, 3).is_err());
    }

    #[test]
    fn test_read_file_uses_name_for_month() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dst2503.for.request");
        std::fs::write(&path, record(31, &[-40; 24])).unwrap();

        let series = read_dst_file(&path).unwrap();
        assert_eq!(series.len(), 24);
        assert_eq!(
            series.times()[0].date(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
        );

        let bad = dir.path().join("dst.txt");
        std::fs::write(&bad, record(1, &[0; 24])).unwrap();
        assert!(read_dst_file(&bad).is_err());
    }
}
