//! A local archive of keograms, space weather data files and the images made from them.

use std::path::PathBuf;

use strum_macros::{EnumIter, IntoStaticStr};

/// The archive.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf, // The root directory.
}

/// The collections kept in an archive, each in its own top level directory with `YYYY/MM`
/// sub-directories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Collection {
    /// Full day keograms as downloaded.
    #[strum(serialize = "full_keograms")]
    FullKeograms,
    /// Hourly slices and keograms stitched from a window of hours.
    #[strum(serialize = "partial_keograms")]
    PartialKeograms,
    /// GOES magnetometer files.
    #[strum(serialize = "GOES_data")]
    Goes,
    /// DSCOVR solar wind files.
    #[strum(serialize = "DSCOVR_data")]
    Dscovr,
    /// Overlay plots on full day keograms.
    #[strum(serialize = "overlaid_full")]
    OverlaidFull,
    /// Overlay plots on partial keograms.
    #[strum(serialize = "overlaid_partial")]
    OverlaidPartial,
    /// Monthly stacks of full day keograms.
    #[strum(serialize = "stacked_by_month")]
    Stacked,
}

impl Collection {
    /// Name of the directory holding this collection.
    pub fn dir_name(self) -> &'static str {
        self.into()
    }
}

mod locate;
mod root;

pub use locate::{files_in, files_under, full_day_keograms, hourly_slices};
pub use root::default_root;
