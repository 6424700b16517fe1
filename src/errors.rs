//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the archive interface.
#[derive(Debug)]
pub enum KeoDataErr {
    // Inherited errors from the imaging and networking stack
    /// Error forwarded from the image crate
    Image(::image::ImageError),
    /// Error forwarded from reqwest
    Network(::reqwest::Error),
    /// Error forwarded from the netcdf crate
    #[cfg(feature = "ncdata")]
    NetCdf(::netcdf::Error),

    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),
    /// Error forwarded from chrono while parsing a date or time
    ChronoParse(chrono::ParseError),
    /// General error with any cause information erased and replaced by a string
    GeneralError(String),

    // My own errors from this crate
    /// A file name did not follow the expected naming convention.
    UnrecognizedFileName(String),
    /// A date string could not be understood.
    InvalidDate(String),
    /// An hour window is empty, reversed or outside of a single day.
    InvalidWindow(f64, f64),
    /// The units attribute of a time variable is not `<unit> since <epoch>`.
    InvalidTimeUnits(String),
    /// A data file lacks a required variable or attribute.
    MissingVariable(String),
    /// Two images that must line up have different dimensions.
    ShapeMismatch {
        /// Dimensions of the first image, (width, height)
        expected: (u32, u32),
        /// Dimensions of the offending image, (width, height)
        found: (u32, u32),
    },
    /// The server answered with an unexpected status.
    HttpStatus(String, u16),
    /// The remote file does not exist.
    RemoteNotFound(String),
    /// No local file matched.
    NotFound(String),
    /// Nearest frame for a wavelength is too far away in time.
    BeyondTolerance {
        /// The wavelength code, e.g. "0630"
        wavelength: String,
        /// Distance in seconds from the reference frame
        seconds: f64,
    },
    /// No frames at all for a required wavelength.
    MissingWavelength(String),
    /// Not enough data to complete the task.
    NotEnoughData,
    /// The crate was built without a feature that is required.
    FeatureDisabled(&'static str),
    /// Rendering a plot failed.
    Plot(String),
    /// There was an internal logic error.
    LogicError(&'static str),
}

impl KeoDataErr {
    /// Errors that mean "this unit of work has nothing to do", the caller should log and move on.
    pub fn is_not_found(&self) -> bool {
        use crate::errors::KeoDataErr::*;

        matches!(
            self,
            UnrecognizedFileName(_) | RemoteNotFound(_) | NotFound(_) | MissingWavelength(_)
        )
    }
}

impl Display for KeoDataErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::KeoDataErr::*;

        match self {
            Image(err) => write!(f, "error from image: {}", err),
            Network(err) => write!(f, "error from reqwest: {}", err),
            #[cfg(feature = "ncdata")]
            NetCdf(err) => write!(f, "error from netcdf: {}", err),

            IO(err) => write!(f, "std lib io error: {}", err),

            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),
            ChronoParse(err) => write!(f, "error parsing date/time: {}", err),
            GeneralError(msg) => write!(f, "general error forwarded: {}", msg),

            UnrecognizedFileName(name) => write!(f, "unrecognized file name: {}", name),
            InvalidDate(input) => write!(f, "invalid date: {}", input),
            InvalidWindow(start, end) => {
                write!(f, "invalid hour window: {:.2} - {:.2}", start, end)
            }
            InvalidTimeUnits(units) => write!(f, "invalid time units: {}", units),
            MissingVariable(name) => write!(f, "missing variable: {}", name),
            ShapeMismatch { expected, found } => write!(
                f,
                "shape mismatch: {}x{} vs {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            HttpStatus(url, code) => write!(f, "HTTP {} from {}", code, url),
            RemoteNotFound(url) => write!(f, "remote file not found: {}", url),
            NotFound(what) => write!(f, "not found: {}", what),
            BeyondTolerance {
                wavelength,
                seconds,
            } => write!(
                f,
                "nearest frame for wavelength {} is {:.1} s away",
                wavelength, seconds
            ),
            MissingWavelength(wave) => write!(f, "no frames for wavelength {}", wave),
            NotEnoughData => write!(f, "not enough data to complete task"),
            FeatureDisabled(feature) => write!(f, "built without the '{}' feature", feature),
            Plot(msg) => write!(f, "plotting error: {}", msg),
            LogicError(msg) => write!(f, "internal logic error: {}", msg),
        }
    }
}

impl Error for KeoDataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use crate::errors::KeoDataErr::*;

        match self {
            Image(err) => Some(err),
            Network(err) => Some(err),
            #[cfg(feature = "ncdata")]
            NetCdf(err) => Some(err),
            IO(err) => Some(err),
            StrumError(err) => Some(err),
            ChronoParse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<::image::ImageError> for KeoDataErr {
    fn from(err: ::image::ImageError) -> KeoDataErr {
        KeoDataErr::Image(err)
    }
}

impl From<::reqwest::Error> for KeoDataErr {
    fn from(err: ::reqwest::Error) -> KeoDataErr {
        KeoDataErr::Network(err)
    }
}

#[cfg(feature = "ncdata")]
impl From<::netcdf::Error> for KeoDataErr {
    fn from(err: ::netcdf::Error) -> KeoDataErr {
        KeoDataErr::NetCdf(err)
    }
}

impl From<::std::io::Error> for KeoDataErr {
    fn from(err: ::std::io::Error) -> KeoDataErr {
        KeoDataErr::IO(err)
    }
}

impl From<tempfile::PersistError> for KeoDataErr {
    fn from(err: tempfile::PersistError) -> KeoDataErr {
        KeoDataErr::IO(err.error)
    }
}

impl From<strum::ParseError> for KeoDataErr {
    fn from(err: strum::ParseError) -> KeoDataErr {
        KeoDataErr::StrumError(err)
    }
}

impl From<chrono::ParseError> for KeoDataErr {
    fn from(err: chrono::ParseError) -> KeoDataErr {
        KeoDataErr::ChronoParse(err)
    }
}

impl From<Box<dyn Error>> for KeoDataErr {
    fn from(err: Box<dyn Error>) -> KeoDataErr {
        KeoDataErr::GeneralError(err.to_string())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_forwarded_errors_have_a_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = KeoDataErr::from(io);

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "no such file");

        let chained: Vec<String> = anyhow::Error::from(err)
            .chain()
            .skip(1)
            .map(|cause| cause.to_string())
            .collect();
        assert_eq!(chained, vec!["no such file".to_owned()]);
    }

    #[test]
    fn test_own_errors_have_no_source() {
        assert!(KeoDataErr::NotEnoughData.source().is_none());
        assert!(KeoDataErr::InvalidWindow(5.0, 3.0).source().is_none());
        assert!(KeoDataErr::NotFound("x".to_owned()).is_not_found());
    }
}
