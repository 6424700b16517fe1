//! Reading the space weather data files that get plotted over keograms.

use std::path::Path;

use log::debug;

use crate::{
    errors::KeoDataErr,
    series::{one_minute, ten_seconds, Resampling, TimeSeries},
};

mod cf_time;
mod dst;
mod gzip;
mod nc;

pub use cf_time::CfUnits;
pub use dst::{parse_dst_quicklook, read_dst_file};
pub use gzip::{decompress_to_temp, is_gzip};

/// The data products that can be overlaid on a keogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Product {
    /// GOES-18 L1b magnetometer, the Hp component of `OB_mag_EPN`.
    GoesMag,
    /// DSCOVR one minute solar wind magnetic field, `bz_gse`.
    DscovrMag,
}

impl Product {
    /// Name of the variable holding the sample times.
    pub fn time_variable(self) -> &'static str {
        match self {
            Product::GoesMag => "OB_time",
            Product::DscovrMag => "time",
        }
    }

    /// Name of the variable holding the measurements.
    pub fn value_variable(self) -> &'static str {
        match self {
            Product::GoesMag => "OB_mag_EPN",
            Product::DscovrMag => "bz_gse",
        }
    }

    /// Column to take when the value variable is a vector per sample.
    pub fn column(self) -> Option<usize> {
        match self {
            Product::GoesMag => Some(1),
            Product::DscovrMag => None,
        }
    }

    /// Name given to series read for this product.
    pub fn series_name(self) -> &'static str {
        match self {
            Product::GoesMag => "GOES-18 Hp",
            Product::DscovrMag => "DSCOVR Bz",
        }
    }

    /// How the raw samples are bucketed before plotting.
    pub fn resampling(self) -> Resampling {
        match self {
            Product::GoesMag => Resampling::Fixed(ten_seconds()),
            Product::DscovrMag => Resampling::Fixed(one_minute()),
        }
    }

    /// Smallest range the axis for this product shows, widened to fit the data.
    pub fn axis_floor(self) -> (f64, f64) {
        match self {
            Product::GoesMag => (0.0, 130.0),
            Product::DscovrMag => (-15.0, 15.0),
        }
    }

    /// Axis label including units.
    pub fn label(self) -> &'static str {
        match self {
            Product::GoesMag => "Hp (nT)",
            Product::DscovrMag => "Bz GSE (nT)",
        }
    }

    /// Line color as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Product::GoesMag => (0xf2, 0x8e, 0x2b),
            Product::DscovrMag => (0x1f, 0x77, 0xb4),
        }
    }

    /// Whether a dashed line marks zero on this product's axis.
    pub fn zero_line(self) -> bool {
        match self {
            Product::GoesMag => false,
            Product::DscovrMag => true,
        }
    }
}

/// Read the series for `product` from a netCDF file, gzipped or not.
///
/// Gzipped files are decompressed to a temporary file that is removed before returning.
pub fn read_series(path: &Path, product: Product) -> Result<TimeSeries, KeoDataErr> {
    if is_gzip(path) {
        let tmp = decompress_to_temp(path, ".nc")?;
        debug!(
            "Decompressed {} to {}",
            path.display(),
            tmp.path().display()
        );
        nc::read_netcdf(tmp.path(), product)
    } else {
        nc::read_netcdf(path, product)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
