//! RGB Compositor.
//!
//! Fuses single wavelength all-sky camera frames from one directory into RGB composites.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Error};
use chrono::NaiveDateTime;
use clap::{crate_version, App, Arg};
use keogram_data::{
    composite, composite_file_name, init_logging, select_triplet, write_png, AsiFrameName,
    ChannelMap, FrameIndex, KeoDataErr,
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
    let matches = App::new("rgbcomp")
        .about("Fuse 0630/0558/0428 all-sky frames into RGB composites.")
        .version(crate_version!())
        .arg(
            Arg::with_name("dir")
                .index(1)
                .required(true)
                .help("Directory of STATION_YYYYMMDD_HHMMSS_WAVE.png frames."),
        )
        .arg(
            Arg::with_name("out-dir")
                .short("o")
                .long("out-dir")
                .takes_value(true)
                .help("Where to write composites, defaults to the frame directory."),
        )
        .arg(
            Arg::with_name("all")
                .short("a")
                .long("all")
                .help("Composite every reference frame instead of only the first."),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Show debug output."),
        )
        .get_matches();

    init_logging(matches.is_present("verbose"));

    let dir = PathBuf::from(matches.value_of("dir").unwrap_or("."));
    if !dir.is_dir() {
        return Err(anyhow!("not a directory: {}", dir.display()));
    }
    let out_dir = matches
        .value_of("out-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.clone());

    let map = ChannelMap::default();
    let index = FrameIndex::scan(&dir);

    info!("Waves found:");
    for (wavelength, count) in index.counts() {
        info!("  {}: {} frames", wavelength, count);
    }

    let references: Vec<(NaiveDateTime, PathBuf)> = index.frames(map.reference()).to_vec();
    if references.is_empty() {
        return Err(KeoDataErr::MissingWavelength(map.reference().to_owned()).into());
    }

    let take = if matches.is_present("all") {
        references.len()
    } else {
        1
    };

    let mut saved = 0;
    for (time, path) in references.iter().take(take) {
        info!("Center frame ({}): {} at {}", map.reference(), path.display(), time);

        match composite_one(&index, &map, *time, path, &out_dir) {
            Ok(out) => {
                saved += 1;
                info!("Saved composite frame to: {}", out.display());
            }
            Err(err) => warn!("[skip] {} {}", time, err),
        }
    }

    if saved == 0 {
        return Err(anyhow!("no composite could be made"));
    }

    Ok(())
}

fn composite_one(
    index: &FrameIndex,
    map: &ChannelMap,
    time: NaiveDateTime,
    reference: &Path,
    out_dir: &Path,
) -> Result<PathBuf, KeoDataErr> {
    let station = reference
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.parse::<AsiFrameName>().ok())
        .map(|name| name.station)
        .ok_or_else(|| KeoDataErr::UnrecognizedFileName(reference.display().to_string()))?;

    let triplet = select_triplet(index, map, time)?;
    let rgb = composite(&triplet)?;

    let out = out_dir.join(composite_file_name(&station, time));
    write_png(&rgb, &out)?;

    Ok(out)
}
