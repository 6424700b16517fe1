//! Command line options that are used across applications.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use clap::{crate_version, App, Arg, ArgMatches};
use log::LevelFilter;

use crate::{
    archive::{default_root, Archive},
    dates::{parse_date_any, DateRange},
    errors::KeoDataErr,
};

/// Struct to package up command line arguments.
#[derive(Clone, Debug)]
pub struct CommonCmdLineArgs {
    // Path to the root of the archive
    root: PathBuf,
    // Days to process
    dates: DateRange,
    // Log at debug level
    verbose: bool,
    // List what would be done without doing it
    dry_run: bool,
}

impl<'a, 'b> CommonCmdLineArgs {
    /// Create a new set of args.
    pub fn new_app(app_name: &'static str, about: &'static str) -> App<'a, 'b> {
        App::new(app_name)
            .about(about)
            .version(crate_version!())
            .arg(
                Arg::with_name("start")
                    .index(1)
                    .help("First date to process (YYYY-MM-DD or YYYYMMDD).")
                    .long_help(
                        "First date to process (YYYY-MM-DD or YYYYMMDD). \
                         Prompted for if not given.",
                    ),
            )
            .arg(
                Arg::with_name("end")
                    .index(2)
                    .help("Last date to process, inclusive.")
                    .long_help(
                        "Last date to process, inclusive. Defaults to the start date when the \
                         start date is given on the command line, otherwise it is prompted for.",
                    ),
            )
            .arg(
                Arg::with_name("root")
                    .short("r")
                    .long("root")
                    .alias("out")
                    .takes_value(true)
                    .help("Path to the archive.")
                    .long_help("Path to the archive. Defaults to '${HOME}/keogram_project/'"),
            )
            .arg(
                Arg::with_name("dry-run")
                    .short("n")
                    .long("dry-run")
                    .help("List what would be done without downloading or writing anything."),
            )
            .arg(
                Arg::with_name("verbose")
                    .short("v")
                    .long("verbose")
                    .help("Show debug output.")
                    .long_help("Show debug output. RUST_LOG overrides this if it is set."),
            )
            .after_help(concat!(
                "Dates may be given as YYYY-MM-DD or YYYYMMDD. The archive is created under the",
                " root if it does not exist yet."
            ))
    }

    /// Process an `App` to get the parsed values out of it and the matches object so an application
    /// can continue with further argument parsing.
    ///
    /// Missing dates are prompted for on the terminal. Invalid dates are an error before any work
    /// is done.
    pub fn matches(app: App<'a, 'b>) -> Result<(Self, ArgMatches<'a>), KeoDataErr> {
        let matches = app.get_matches();

        let root = matches
            .value_of("root")
            .map(PathBuf::from)
            .or_else(default_root)
            .ok_or(KeoDataErr::NotFound("home directory".to_owned()))?;

        let dates = match (matches.value_of("start"), matches.value_of("end")) {
            (Some(start), end) => parse_date_args(start, end)?,
            (None, _) => {
                let start = prompt("Start date (YYYY-MM-DD or YYYYMMDD): ")?;
                let end = prompt("End date   (YYYY-MM-DD or YYYYMMDD): ")?;
                let end = if end.is_empty() { None } else { Some(end.as_str()) };
                parse_date_args(&start, end)?
            }
        };

        let cmd_line_opts = CommonCmdLineArgs {
            root,
            dates,
            verbose: matches.is_present("verbose"),
            dry_run: matches.is_present("dry-run"),
        };

        Ok((cmd_line_opts, matches))
    }

    /// Get the root of the archive
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the dates to process.
    pub fn dates(&self) -> DateRange {
        self.dates
    }

    /// Whether debug output was requested.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Whether this is a dry run.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Open the archive, creating the directory layout if needed.
    pub fn archive(&self) -> Result<Archive, KeoDataErr> {
        Archive::create(&self.root)
    }
}

/// Build the date range from a start date and an optional end date.
pub fn parse_date_args(start: &str, end: Option<&str>) -> Result<DateRange, KeoDataErr> {
    let start = parse_date_any(start)?;
    let end = match end {
        Some(end) => parse_date_any(end)?,
        None => start,
    };

    DateRange::new(start, end)
}

/// Parse an hour window `SS-EE` with an exclusive end, `0 <= SS < EE <= 24`.
pub fn parse_hour_window(input: &str) -> Result<(u8, u8), KeoDataErr> {
    let bad = || KeoDataErr::InvalidWindow(f64::NAN, f64::NAN);

    let (start, end) = input.trim().split_once('-').ok_or_else(bad)?;
    let start: u8 = start.trim().parse().map_err(|_| bad())?;
    let end: u8 = end.trim().parse().map_err(|_| bad())?;

    if start >= end || end > 24 {
        return Err(KeoDataErr::InvalidWindow(f64::from(start), f64::from(end)));
    }

    Ok((start, end))
}

/// Print a question and read one trimmed line from standard input.
pub fn prompt(question: &str) -> Result<String, KeoDataErr> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "{}", question)?;
    out.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(answer.trim().to_owned())
}

/// Start logging to standard error, at debug level when `verbose` and info level otherwise.
///
/// `RUST_LOG` takes precedence when it is set.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    // A second initialisation, as in tests, is harmless.
    let _ = builder.try_init();
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_date_args() {
        let range = parse_date_args("2025-03-01", Some("20250303")).unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(range.end(), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

        let single = parse_date_args("20250301", None).unwrap();
        assert_eq!(single.start(), single.end());

        assert!(parse_date_args("2025-03-03", Some("2025-03-01")).is_err());
        assert!(parse_date_args("03/01/2025", None).is_err());
    }

    #[test]
    fn test_parse_hour_window() {
        assert_eq!(parse_hour_window("04-10").unwrap(), (4, 10));
        assert_eq!(parse_hour_window(" 0-24 ").unwrap(), (0, 24));

        assert!(parse_hour_window("10-04").is_err());
        assert!(parse_hour_window("05-05").is_err());
        assert!(parse_hour_window("20-25").is_err());
        assert!(parse_hour_window("ten-eleven").is_err());
        assert!(parse_hour_window("10").is_err());
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(false);
        init_logging(true);
    }
}
