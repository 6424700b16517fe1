//! Keogram Stitcher.
//!
//! Groups the hourly keogram slices already on disk by date and stitches each day into one
//! partial keogram.

use std::path::PathBuf;

use anyhow::Error;
use clap::Arg;
use keogram_data::{
    hourly_slices, init_logging, open_rgb, stitch_horizontal, write_png, Archive, Collection,
    CommonCmdLineArgs, HeightPolicy, HourlySliceName, KeoDataErr, PartialName, PartialStyle,
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
        "keostitch",
        "Stitch hourly keogram slices into partial keograms.",
    )
    .arg(
        Arg::with_name("dir")
            .long("dir")
            .takes_value(true)
            .help("Directory holding the hourly slices.")
            .long_help(
                "Directory holding the hourly slices. Defaults to the month directories of the \
                 partial keogram collection.",
            ),
    )
    .arg(
        Arg::with_name("resize")
            .long("resize")
            .help("Scale slices to a common height instead of padding them."),
    );

    let (common_args, matches) = CommonCmdLineArgs::matches(app)?;
    init_logging(common_args.verbose());

    let arch = common_args.archive()?;
    let dates = common_args.dates();
    let policy = if matches.is_present("resize") {
        HeightPolicy::Resize
    } else {
        HeightPolicy::Lenient
    };

    let dirs: Vec<PathBuf> = match matches.value_of("dir") {
        Some(dir) => vec![PathBuf::from(dir)],
        None => dates
            .by_month()
            .into_iter()
            .filter_map(|(_, days)| days.first().copied())
            .map(|day| arch.month_dir(Collection::PartialKeograms, day))
            .collect(),
    };

    for dir in dirs {
        for (date, slices) in hourly_slices(&dir) {
            if date < dates.start() || date > dates.end() {
                continue;
            }

            if common_args.dry_run() {
                info!(
                    "[dry ] {} {} slice(s) in {}",
                    date,
                    slices.len(),
                    dir.display()
                );
                continue;
            }

            match stitch_day(&arch, &slices, policy) {
                Ok(out) => info!("Saved partial keogram for {}: {}", date, out.display()),
                Err(err) => warn!("[fail] {} {}", date, err),
            }
        }
    }

    Ok(())
}

fn stitch_day(
    arch: &Archive,
    slices: &[(HourlySliceName, PathBuf)],
    policy: HeightPolicy,
) -> Result<PathBuf, KeoDataErr> {
    let (first, last) = match (slices.first(), slices.last()) {
        (Some((first, _)), Some((last, _))) => (first, last),
        _ => return Err(KeoDataErr::NotEnoughData),
    };

    let images = slices
        .iter()
        .map(|(name, path)| -> Result<_, KeoDataErr> { Ok((name.hour, open_rgb(path)?)) })
        .collect::<Result<Vec<_>, KeoDataErr>>()?;

    let stitched = stitch_horizontal(images, policy)?;

    let name = PartialName {
        date: first.date,
        start_hour: first.hour,
        end_hour: last.hour + 1,
        site: first.site.clone(),
        camera: first.camera.clone(),
        style: PartialStyle::Partial,
    };

    let out = arch.output_path(Collection::PartialKeograms, first.date, &name.to_string())?;
    write_png(&stitched, &out)?;

    Ok(out)
}
