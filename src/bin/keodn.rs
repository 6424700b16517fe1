//! Keogram Downloader.
//!
//! Downloads full day keograms from the AMISR archive and stores them in your archive.

use std::{path::PathBuf, time::Duration};

use anyhow::Error;
use chrono::NaiveDate;
use clap::Arg;
use keogram_data::{
    init_logging, AmisrArchive, Collection, CommonCmdLineArgs, Fetcher, KeoDataErr,
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

// Result from a single step in the processing chain
enum StepResult {
    Downloaded(PathBuf, u64),          // Destination, bytes
    AlreadyHave(PathBuf),              // Destination
    DryRun(String, PathBuf),           // URL, destination
    URLNotFound(String),               // URL
    OtherURLStatus(String, u16),       // URL, status code
    OtherDownloadError(KeoDataErr),    // Any other error downloading
}

#[derive(Default)]
struct Tally {
    saved: usize,
    skipped: usize,
    missing: usize,
    failed: usize,
}

fn run() -> Result<(), Error> {
    let app = CommonCmdLineArgs::new_app("keodn", "Download full day keograms into your archive.")
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
            Arg::with_name("skip-existing")
                .long("skip-existing")
                .help("Do not download keograms that are already in the archive."),
        );

    let (common_args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(common_args.verbose());

    let amisr = AmisrArchive::new(
        matches.value_of("station").unwrap_or("pfrr_amisr01"),
        matches.value_of("camera").unwrap_or("asi3"),
    );
    let skip_existing = matches.is_present("skip-existing");
    let dry_run = common_args.dry_run();

    let arch = common_args.archive()?;
    let fetcher = Fetcher::new(Duration::from_secs(60))?;

    let mut tally = Tally::default();

    common_args
        .dates()
        .days()
        // Build the url and the destination
        .map(|date| {
            let url = amisr.full_keogram_url(date);
            let dest = arch
                .month_dir(Collection::FullKeograms, date)
                .join(amisr.full_keogram_name(date));
            (date, url, dest)
        })
        // Attempt the download
        .map(|(date, url, dest)| {
            let result = if skip_existing && dest.exists() {
                StepResult::AlreadyHave(dest)
            } else if dry_run {
                StepResult::DryRun(url, dest)
            } else {
                match fetcher.download(&url, &dest) {
                    Ok(bytes) => StepResult::Downloaded(dest, bytes),
                    Err(KeoDataErr::RemoteNotFound(url)) => StepResult::URLNotFound(url),
                    Err(KeoDataErr::HttpStatus(url, code)) => StepResult::OtherURLStatus(url, code),
                    Err(err) => StepResult::OtherDownloadError(err),
                }
            };

            (date, result)
        })
        // Report
        .for_each(|(date, result)| report(date, result, &mut tally));

    info!(
        "Done: {} saved, {} skipped, {} missing, {} failed.",
        tally.saved, tally.skipped, tally.missing, tally.failed
    );

    Ok(())
}

fn report(date: NaiveDate, result: StepResult, tally: &mut Tally) {
    use crate::StepResult::*;

    match result {
        Downloaded(dest, bytes) => {
            tally.saved += 1;
            info!("[SAVED] {} ({} bytes)", dest.display(), bytes);
        }
        AlreadyHave(dest) => {
            tally.skipped += 1;
            info!("[skip] {} exists", dest.display());
        }
        DryRun(url, dest) => {
            info!("[dry ] {} -> {}", url, dest.display());
        }
        URLNotFound(url) => {
            tally.missing += 1;
            warn!("[404 ] {} no keogram at {}", date, url);
        }
        OtherURLStatus(url, code) => {
            tally.failed += 1;
            warn!("[{}] {} HTTP error from {}", code, date, url);
        }
        OtherDownloadError(err) => {
            tally.failed += 1;
            warn!("[fail] {} {}", date, err);
        }
    }
}
