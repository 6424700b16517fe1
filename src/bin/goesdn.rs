//! GOES Downloader.
//!
//! Downloads GOES-18 magnetometer L1b files and stores them in your archive. Each monthly index on
//! the server is only fetched once.

use std::{path::PathBuf, time::Duration};

use anyhow::Error;
use chrono::NaiveDate;
use keogram_data::{init_logging, Collection, CommonCmdLineArgs, Fetcher, GoesArchive, KeoDataErr};
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

fn run() -> Result<(), Error> {
    let app = CommonCmdLineArgs::new_app(
        "goesdn",
        "Download GOES-18 magnetometer files into your archive.",
    );

    let (common_args, _matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(common_args.verbose());

    let arch = common_args.archive()?;
    let fetcher = Fetcher::new(Duration::from_secs(60))?;
    let goes = GoesArchive::default();

    let discovered = discover(&fetcher, &goes, &common_args);
    if discovered.is_empty() {
        warn!("No files matched the requested range.");
        return Ok(());
    }
    info!("Found {} file(s).", discovered.len());

    if common_args.dry_run() {
        for (date, _, url) in &discovered {
            info!("[dry ] {}  {}", date, url);
        }
        return Ok(());
    }

    let mut downloaded = 0;
    for (date, name, url) in &discovered {
        let dest: PathBuf = arch.month_dir(Collection::Goes, *date).join(name);

        match fetcher.download(url, &dest) {
            Ok(_) => {
                downloaded += 1;
                info!("[SAVED] {}", dest.display());
            }
            Err(err) => warn!("[fail] {}  ({})", url, err),
        }
    }

    info!("Done. Downloaded: {}/{}", downloaded, discovered.len());

    Ok(())
}

/// (date, file name, url) of every file on the server for the requested days.
fn discover(
    fetcher: &Fetcher,
    goes: &GoesArchive,
    common_args: &CommonCmdLineArgs,
) -> Vec<(NaiveDate, String, String)> {
    let mut discovered = vec![];

    for ((year, month), days) in common_args.dates().by_month() {
        let index_url = goes.month_url(year, month);

        let hrefs = match fetcher.index(&index_url) {
            Ok(hrefs) => hrefs,
            Err(KeoDataErr::HttpStatus(url, code)) => {
                warn!("! {} -> HTTP {}", url, code);
                continue;
            }
            Err(err) => {
                warn!("! error fetching {}: {}", index_url, err);
                continue;
            }
        };

        for date in days {
            let files = goes.files_for_day(&hrefs, date);
            if files.is_empty() {
                warn!("[MISS] {} no file found in {}", date, index_url);
            }

            for name in files {
                let url = goes.file_url(date, &name);
                discovered.push((date, name, url));
            }
        }
    }

    discovered
}
