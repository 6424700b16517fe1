//! Keogram Overlay.
//!
//! Plots GOES-18 Hp and DSCOVR Bz over the full day or partial keogram of each date.

use std::{path::PathBuf, time::Duration};

use anyhow::Error;
use chrono::NaiveDate;
use clap::Arg;
use keogram_data::{
    init_logging, open_rgb, overlay_file_name, parse_hour_window, read_series, scrape_hours,
    time_bounds, AmisrArchive, Archive, AxisStyle, Collection, CommonCmdLineArgs, Fetcher,
    KeoDataErr, Keogram, OverlayPlot, PlotOptions, Product, TimeWindow,
};
use log::{info, warn};

fn main() {
    if let Err(ref e) = run() {
        eprintln!("error: {}", e);

        for cause in e.chain().skip(1) {
            eprintln!("caused by: {}", cause);
        }

        ::std::process::exit(1);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Full,
    Partial,
}

struct Job<'a> {
    arch: &'a Archive,
    amisr: &'a AmisrArchive,
    fetcher: &'a Fetcher,
    mode: Mode,
    window: Option<(u8, u8)>,
    dry_run: bool,
}

fn run() -> Result<(), Error> {
    let app = CommonCmdLineArgs::new_app(
        "keolay",
        "Plot GOES and DSCOVR magnetic field data over keograms.",
    )
    .arg(
        Arg::with_name("partial")
            .short("p")
            .long("partial")
            .help("Plot over partial keograms instead of full day keograms."),
    )
    .arg(
        Arg::with_name("window")
            .short("w")
            .long("window")
            .takes_value(true)
            .help("Fixed window of hours as SS-EE, end exclusive.")
            .long_help(
                "Fixed window of hours as SS-EE, end exclusive. Without it the window of a full \
                 day plot is the hours the camera recorded, found on the AMISR server, and the \
                 window of a partial plot comes from the keogram file name.",
            ),
    )
    .arg(
        Arg::with_name("station")
            .long("station")
            .takes_value(true)
            .default_value("pfrr_amisr01")
            .help("Station directory on the AMISR server."),
    );

    let (common_args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(common_args.verbose());

    let window = matches.value_of("window").map(parse_hour_window).transpose()?;
    let mode = if matches.is_present("partial") {
        Mode::Partial
    } else {
        Mode::Full
    };

    let arch = common_args.archive()?;
    let amisr = AmisrArchive::new(
        matches.value_of("station").unwrap_or("pfrr_amisr01"),
        "asi3",
    );
    let fetcher = Fetcher::new(Duration::from_secs(30))?;

    let job = Job {
        arch: &arch,
        amisr: &amisr,
        fetcher: &fetcher,
        mode,
        window,
        dry_run: common_args.dry_run(),
    };

    for date in common_args.dates().days() {
        match process_date(&job, date) {
            Ok(Some(out)) => info!("[SAVED] {}", out.display()),
            Ok(None) => {}
            Err(err) => warn!("[MISS] {} {}", date.format("%Y%m%d"), err),
        }
    }

    Ok(())
}

fn process_date(job: &Job, date: NaiveDate) -> Result<Option<PathBuf>, KeoDataErr> {
    let ymd = date.format("%Y%m%d").to_string();

    let (keogram, (first, last), collection, options) = match job.mode {
        Mode::Full => {
            let path = job
                .arch
                .full_keogram(date)
                .ok_or_else(|| KeoDataErr::NotFound(format!("full keogram for {}", ymd)))?;

            let (first, last) = match job.window {
                Some(window) => window,
                None => scrape_window(job, date)?,
            };

            let keogram =
                Keogram::full_day(open_rgb(&path)?).crop(f64::from(first), f64::from(last));
            let title = format!("GOES-18 Hp and DSCOVR Bz over Keogram: {}", ymd);

            (
                keogram,
                (first, last),
                Collection::OverlaidFull,
                PlotOptions::full_day(title),
            )
        }
        Mode::Partial => {
            let (path, name) = job
                .arch
                .partial_keogram(date)
                .ok_or_else(|| KeoDataErr::NotFound(format!("partial keogram for {}", ymd)))?;

            let keogram = Keogram::open(
                &path,
                f64::from(name.start_hour),
                f64::from(name.end_hour),
            )?;
            let (first, last) = match job.window {
                Some((start, end)) => (start.max(name.start_hour), end.min(name.end_hour)),
                None => (name.start_hour, name.end_hour),
            };
            if last <= first {
                return Err(KeoDataErr::InvalidWindow(f64::from(first), f64::from(last)));
            }

            let keogram = keogram.crop(f64::from(first), f64::from(last));
            let title = format!(
                "GOES-18 Hp and DSCOVR Bz over Partial Keogram: {} ({:02}-{:02} UTC)",
                ymd, first, last
            );

            (
                keogram,
                (first, last),
                Collection::OverlaidPartial,
                PlotOptions::partial(title),
            )
        }
    };

    let window = TimeWindow::from_hours(date, first, last)?;
    let file_name = match (job.mode, job.window) {
        (Mode::Full, None) => overlay_file_name(date, None),
        _ => overlay_file_name(date, Some((first, last))),
    };

    let data_files = [
        (Product::GoesMag, job.arch.goes_file(date)),
        (Product::DscovrMag, job.arch.dscovr_file(date)),
    ];

    if job.dry_run {
        info!(
            "[dry ] {} {:02}-{:02} GOES:{} DSCOVR:{} -> {}",
            ymd,
            first,
            last,
            data_files[0].1.is_some(),
            data_files[1].1.is_some(),
            file_name
        );
        return Ok(None);
    }

    let mut plot = OverlayPlot::new(keogram, window, options);

    for (product, path) in &data_files {
        let path = match path {
            Some(path) => path,
            None => {
                warn!("[MISS] {} file not found for {}", product.label(), ymd);
                continue;
            }
        };

        match read_series(path, *product) {
            Ok(series) => {
                let aligned = series.resampled(product.resampling()).align(&window);
                plot.add(&aligned, AxisStyle::for_product(*product));
            }
            Err(err) => warn!("[MISS] {} read failed for {}: {}", product.label(), ymd, err),
        }
    }

    let out = job.arch.output_path(collection, date, &file_name)?;
    plot.save(&out)?;

    Ok(Some(out))
}

/// The hours the camera recorded, from the `utHH/` folders on the AMISR day page.
fn scrape_window(job: &Job, date: NaiveDate) -> Result<(u8, u8), KeoDataErr> {
    let hrefs = job.fetcher.index(&job.amisr.day_url(date))?;

    time_bounds(&scrape_hours(&hrefs))
        .ok_or_else(|| KeoDataErr::NotFound("utHH/ folders on the AMISR day page".to_owned()))
}
