#![deny(missing_docs)]
//! Package to manage an archive of auroral keograms and the space weather data plotted over them.
//!
//! Keograms and magnetometer files are downloaded from public archives into an [`Archive`], cut
//! and stitched along the hour-of-day axis, stacked by month, and overlaid with GOES and DSCOVR
//! magnetic field series.

//
// Public API
//
pub use crate::archive::{
    default_root, files_in, files_under, full_day_keograms, hourly_slices, Archive, Collection,
};
pub use crate::cmd_line::{
    init_logging, parse_date_args, parse_hour_window, prompt, CommonCmdLineArgs,
};
pub use crate::composite::{
    composite, find_nearest, fuse_channels, normalize, select_triplet, Channel, ChannelMap,
    FrameIndex, Triplet,
};
pub use crate::dates::{hours_since_midnight, midnight, parse_date_any, DateRange};
pub use crate::errors::KeoDataErr;
pub use crate::keogram::{
    attach_left, open_rgb, reference_line_x, stack_vertical, stitch_horizontal, write_png,
    HeightPolicy, Keogram, StackOptions,
};
pub use crate::names::{
    composite_file_name, dst_strip_file_names, overlay_file_name, site_of_station, AsiFrameName,
    DscovrName, DstFileName, FullDayName, GoesMagName, HourlySliceName, PartialName, PartialStyle,
    StackedName,
};
pub use crate::overlay::{
    AxisMap, AxisStyle, DstStrip, Overlay, OverlayPlot, PlotOptions, MAX_GAP_HOURS,
};
pub use crate::remote::{
    check_status, extract_hrefs, scrape_hours, time_bounds, AmisrArchive, Fetcher, GoesArchive,
    BROWSER_UA,
};
pub use crate::series::{axis_limits, AlignedSeries, Resampling, TimeSeries};
pub use crate::sources::{parse_dst_quicklook, read_dst_file, read_series, CfUnits, Product};
pub use crate::window::{crop_columns, format_hour, ColumnSpan, TimeWindow};

//
// Implementation only
//
mod archive;
mod cmd_line;
mod composite;
mod dates;
mod errors;
mod keogram;
mod names;
mod overlay;
mod remote;
mod series;
mod sources;
mod window;
