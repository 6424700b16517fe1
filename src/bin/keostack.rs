//! Keogram Stacker.
//!
//! Stacks the full day keograms of each month top to bottom, with reference lines at fixed hours,
//! and optionally puts a vertical Dst strip down the left side.

use std::path::{Path, PathBuf};

use anyhow::Error;
use chrono::{Datelike, NaiveDate};
use clap::Arg;
use keogram_data::{
    attach_left, dst_strip_file_names, full_day_keograms, init_logging, open_rgb, read_dst_file,
    stack_vertical, write_png, Archive, Collection, CommonCmdLineArgs, DstFileName, DstStrip,
    KeoDataErr, StackOptions, StackedName,
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

fn run() -> Result<(), Error> {
    let app = CommonCmdLineArgs::new_app(
        "keostack",
        "Stack full day keograms by month with UTC reference lines.",
    )
    .arg(
        Arg::with_name("dst-dir")
            .long("dst-dir")
            .takes_value(true)
            .help("Directory with monthly dstYYMM.for.request files.")
            .long_help(
                "Directory with monthly quick-look Dst files named dstYYMM.for.request. When \
                 given, a vertical Dst strip is drawn and joined to the left of each stack.",
            ),
    );

    let (common_args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(common_args.verbose());

    let arch = common_args.archive()?;
    let dst_dir = matches.value_of("dst-dir").map(PathBuf::from);
    let months: Vec<(i32, u32)> = common_args
        .dates()
        .by_month()
        .into_iter()
        .map(|(month, _)| month)
        .collect();

    let dates = common_args.dates();
    let options = StackOptions::default();

    for ((year, month), days) in full_day_keograms(&arch.collection_dir(Collection::FullKeograms))
    {
        if !months.contains(&(year, month)) {
            continue;
        }

        let days: Vec<(NaiveDate, PathBuf)> = days
            .into_iter()
            .filter(|(date, _)| *date >= dates.start() && *date <= dates.end())
            .collect();

        if common_args.dry_run() {
            info!("[dry ] {:04}-{:02} {} keogram(s)", year, month, days.len());
            continue;
        }

        match stack_month(&arch, &days, &options, dst_dir.as_deref()) {
            Ok(out) => info!(
                "Saved stacked image for {:04}{:02} to {}",
                year,
                month,
                out.display()
            ),
            Err(err) => warn!("[fail] {:04}-{:02} {}", year, month, err),
        }
    }

    Ok(())
}

fn stack_month(
    arch: &Archive,
    days: &[(NaiveDate, PathBuf)],
    options: &StackOptions,
    dst_dir: Option<&Path>,
) -> Result<PathBuf, KeoDataErr> {
    let first = days.first().map(|(date, _)| *date).ok_or(KeoDataErr::NotEnoughData)?;

    let mut images = vec![];
    for (date, path) in days {
        match open_rgb(path) {
            Ok(img) => images.push(img),
            Err(err) => warn!("[skip] {} {}: {}", date, path.display(), err),
        }
    }

    let stacked = stack_vertical(&images, options)?;

    let name = StackedName::for_date(first).to_string();
    let out = arch.output_path(Collection::Stacked, first, &name)?;
    write_png(&stacked, &out)?;

    if let Some(dst_dir) = dst_dir {
        let dst_name = DstFileName {
            year: first.year(),
            month: first.month(),
        };
        let dst_path = dst_dir.join(dst_name.to_string());

        match add_dst_strip(arch, first, &dst_path, &stacked) {
            Ok((strip, combo)) => {
                info!("Dst strip saved -> {}", strip.display());
                info!("Composite saved -> {}", combo.display());
            }
            Err(err) => warn!("[MISS] Dst strip for {}: {}", dst_path.display(), err),
        }
    }

    Ok(out)
}

fn add_dst_strip(
    arch: &Archive,
    first: NaiveDate,
    dst_path: &Path,
    stacked: &image::RgbImage,
) -> Result<(PathBuf, PathBuf), KeoDataErr> {
    let series = read_dst_file(dst_path)?;
    let strip = DstStrip::default().render(&series, stacked.height())?;

    let (strip_name, combo_name) = dst_strip_file_names(first.year(), first.month());

    let strip_out = arch.output_path(Collection::Stacked, first, &strip_name)?;
    write_png(&strip, &strip_out)?;

    let combo_out = arch.output_path(Collection::Stacked, first, &combo_name)?;
    write_png(&attach_left(&strip, stacked), &combo_out)?;

    Ok((strip_out, combo_out))
}
