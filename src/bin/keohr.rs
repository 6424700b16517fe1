//! Hourly Keogram Downloader.
//!
//! Finds the hours a camera recorded on a day, downloads the hourly keogram slices for a window of
//! those hours, and stitches them into one partial keogram in your archive.

use std::{path::PathBuf, time::Duration};

use anyhow::Error;
use chrono::NaiveDate;
use clap::Arg;
use keogram_data::{
    init_logging, open_rgb, parse_hour_window, prompt, scrape_hours, stitch_horizontal,
    time_bounds, write_png, AmisrArchive, Archive, Collection, CommonCmdLineArgs, Fetcher,
    HeightPolicy, KeoDataErr, PartialName, PartialStyle,
};
use log::{debug, info, warn};

fn main() {
    if let Err(ref e) = run() {
        eprintln!("error: {}", e);

        for cause in e.chain().skip(1) {
            eprintln!("caused by: {}", cause);
        }

        ::std::process::exit(1);
    }
}

struct Job<'a> {
    amisr: &'a AmisrArchive,
    arch: &'a Archive,
    fetcher: &'a Fetcher,
    window: Option<(u8, u8)>,
    keep_segments: bool,
    dry_run: bool,
}

fn run() -> Result<(), Error> {
    let app = CommonCmdLineArgs::new_app(
        "keohr",
        "Download hourly keogram slices for a window of hours and stitch them together.",
    )
    .arg(
        Arg::with_name("station")
            .long("station")
            .takes_value(true)
            .default_value("pfrr_amisr01")
            .help("Station directory on the AMISR server."),
    )
    .arg(
        Arg::with_name("camera")
            .long("camera")
            .takes_value(true)
            .default_value("asi3")
            .help("Camera code used in the file names."),
    )
    .arg(
        Arg::with_name("hours")
            .long("hours")
            .takes_value(true)
            .help("Window of hours as SS-EE, end exclusive. Prompted for if not given."),
    )
    .arg(
        Arg::with_name("keep-segments")
            .long("keep-segments")
            .help("Keep the hourly slices next to the stitched keogram."),
    );

    let (common_args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(common_args.verbose());

    let window = matches.value_of("hours").map(parse_hour_window).transpose()?;

    let amisr = AmisrArchive::new(
        matches.value_of("station").unwrap_or("pfrr_amisr01"),
        matches.value_of("camera").unwrap_or("asi3"),
    );
    let arch = common_args.archive()?;
    let fetcher = Fetcher::new(Duration::from_secs(60))?;

    let job = Job {
        amisr: &amisr,
        arch: &arch,
        fetcher: &fetcher,
        window,
        keep_segments: matches.is_present("keep-segments"),
        dry_run: common_args.dry_run(),
    };

    for date in common_args.dates().days() {
        match process_day(&job, date) {
            Ok(()) => {}
            Err(err @ KeoDataErr::InvalidWindow(..)) => return Err(err.into()),
            Err(err) if err.is_not_found() => warn!("[MISS] {} {}", date, err),
            Err(err) => warn!("[fail] {} {}", date, err),
        }
    }

    Ok(())
}

fn process_day(job: &Job, date: NaiveDate) -> Result<(), KeoDataErr> {
    let available = scrape_hours(&job.fetcher.index(&job.amisr.day_url(date))?);
    debug!(
        "[scraped hours] {}",
        available
            .iter()
            .map(|h| format!("{:02}", h))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let (first, end) = match job.window {
        Some(window) => window,
        None => prompt_window(&available, date)?,
    };

    let chosen: Vec<u8> = available
        .iter()
        .copied()
        .filter(|h| *h >= first && *h < end)
        .collect();
    if chosen.is_empty() {
        return Err(KeoDataErr::NotFound(format!(
            "hour directories in {:02}-{:02}",
            first, end
        )));
    }

    // Find the actual file name in each hour directory
    let mut picks: Vec<(u8, String, String)> = vec![];
    for hour in chosen {
        let hour_url = job.amisr.hour_url(date, hour);

        match job
            .fetcher
            .index(&hour_url)
            .map(|hrefs| job.amisr.pick_hour_file(&hrefs, date, hour))
        {
            Ok(Some(name)) => {
                debug!("[pick] {}{}", hour_url, name);
                picks.push((hour, format!("{}{}", hour_url, name), name));
            }
            Ok(None) => warn!("[miss] no keogram PNG found in {}", hour_url),
            Err(err) => warn!("[miss] {}: {}", hour_url, err),
        }
    }

    if picks.is_empty() {
        return Err(KeoDataErr::NotFound(
            "hourly files in the selected window".to_owned(),
        ));
    }

    if job.dry_run {
        for (_, url, _) in &picks {
            info!("[dry ] {}", url);
        }
        return Ok(());
    }

    // Hourly slices go to a scratch directory unless they are kept
    let scratch = if job.keep_segments {
        None
    } else {
        Some(tempfile::tempdir()?)
    };
    let segment_dir: PathBuf = match &scratch {
        Some(tmp) => tmp.path().to_path_buf(),
        None => job.arch.month_dir(Collection::PartialKeograms, date),
    };

    let mut slices = vec![];
    for (hour, url, name) in picks {
        let dest = segment_dir.join(&name);

        match job
            .fetcher
            .download(&url, &dest)
            .and_then(|_| open_rgb(&dest))
        {
            Ok(img) => slices.push((hour, img)),
            Err(err) => warn!("[fail] {} ({})", url, err),
        }
    }

    // The stitched image spans the hours that were downloaded, gaps filled in by the stitcher
    let (start_hour, end_hour) = match (
        slices.iter().map(|(hour, _)| *hour).min(),
        slices.iter().map(|(hour, _)| *hour).max(),
    ) {
        (Some(lo), Some(hi)) => (lo, hi + 1),
        _ => return Err(KeoDataErr::NotFound(format!("slices for {:02}-{:02}", first, end))),
    };
    if (start_hour, end_hour) != (first, end) {
        warn!(
            "[part] {} covers {:02}-{:02} of the requested {:02}-{:02}",
            date, start_hour, end_hour, first, end
        );
    }

    let stitched = stitch_horizontal(slices, HeightPolicy::Resize)?;

    let name = PartialName {
        date,
        start_hour,
        end_hour,
        site: job.amisr.site().to_owned(),
        camera: job.amisr.camera().to_owned(),
        style: PartialStyle::Concat,
    };
    let out = job
        .arch
        .output_path(Collection::PartialKeograms, date, &name.to_string())?;
    write_png(&stitched, &out)?;
    info!("[SAVED] {}", out.display());

    if scratch.is_some() {
        info!("[CLEAN] removed individual hour segments (kept stitched image).");
    }

    Ok(())
}

/// Ask for a window within the available hours, both ends inclusive, and return it with an
/// exclusive end.
fn prompt_window(available: &[u8], date: NaiveDate) -> Result<(u8, u8), KeoDataErr> {
    let (first, end) = time_bounds(available)
        .ok_or_else(|| KeoDataErr::NotFound("utHH/ folders on the day page".to_owned()))?;
    let last = end - 1;

    println!(
        "Available hour window for {} (UTC): {:02}-{:02}",
        date, first, last
    );

    let start = prompt(&format!("Start hour [{:02}]: ", first))?;
    let stop = prompt(&format!("End hour [{:02}]: ", last))?;

    let parse = |input: &str, default: u8| -> Result<u8, KeoDataErr> {
        if input.is_empty() {
            return Ok(default);
        }
        input
            .parse::<u8>()
            .map_err(|_| KeoDataErr::InvalidWindow(f64::NAN, f64::NAN))
    };
    let (start, stop) = (parse(&start, first)?, parse(&stop, last)?);

    if stop < start || start < first || stop > last {
        return Err(KeoDataErr::InvalidWindow(
            f64::from(start),
            f64::from(stop) + 1.0,
        ));
    }

    Ok((start, stop + 1))
}
