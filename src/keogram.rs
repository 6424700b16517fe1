//! Keogram images: loading, cropping to a window of hours, and writing.

use std::path::Path;

use image::{imageops, ImageFormat, RgbImage};
use tempfile::NamedTempFile;

use crate::{
    errors::KeoDataErr,
    window::crop_columns_within,
};

mod stack;
mod stitch;

pub use stack::{attach_left, reference_line_x, stack_vertical, StackOptions};
pub use stitch::{stitch_horizontal, HeightPolicy};

/// A keogram image whose columns span the hours `[start_hour, end_hour)` linearly.
#[derive(Clone, Debug)]
pub struct Keogram {
    image: RgbImage,
    start_hour: f64,
    end_hour: f64,
}

impl Keogram {
    /// Wrap an image covering `[start_hour, end_hour)`.
    pub fn new(image: RgbImage, start_hour: f64, end_hour: f64) -> Result<Self, KeoDataErr> {
        if !(start_hour >= 0.0 && end_hour <= 24.0 && end_hour > start_hour) {
            return Err(KeoDataErr::InvalidWindow(start_hour, end_hour));
        }

        Ok(Keogram {
            image,
            start_hour,
            end_hour,
        })
    }

    /// Wrap an image covering the whole day.
    pub fn full_day(image: RgbImage) -> Self {
        Keogram {
            image,
            start_hour: 0.0,
            end_hour: 24.0,
        }
    }

    /// Load a keogram image covering `[start_hour, end_hour)` from disk.
    pub fn open(path: &Path, start_hour: f64, end_hour: f64) -> Result<Self, KeoDataErr> {
        Self::new(open_rgb(path)?, start_hour, end_hour)
    }

    /// The pixels.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Take the pixels.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// First hour covered.
    pub fn start_hour(&self) -> f64 {
        self.start_hour
    }

    /// End of the hours covered, exclusive.
    pub fn end_hour(&self) -> f64 {
        self.end_hour
    }

    /// Keep only the columns for `[first, last)`, clamped to the hours this keogram covers.
    ///
    /// At least one column is always kept.
    pub fn crop(&self, first: f64, last: f64) -> Keogram {
        let (width, height) = self.image.dimensions();
        let span = crop_columns_within(width, (self.start_hour, self.end_hour), first, last);

        let image = imageops::crop_imm(&self.image, span.x0, 0, span.width(), height).to_image();

        let start_hour = first.max(self.start_hour).min(self.end_hour);
        let end_hour = last.min(self.end_hour).max(start_hour);

        Keogram {
            image,
            start_hour,
            end_hour,
        }
    }
}

/// Load any image the `image` crate understands as 8 bit RGB.
pub fn open_rgb(path: &Path) -> Result<RgbImage, KeoDataErr> {
    Ok(image::open(path)?.to_rgb8())
}

/// Write a PNG so that `path` either holds the complete image or is left untouched.
///
/// The image goes to a temporary file in the same directory which is renamed on success.
pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), KeoDataErr> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    image.write_to(&mut tmp, ImageFormat::Png)?;
    tmp.persist(path)?;

    Ok(())
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    /// A day of 240 columns, 10 per hour, each column's red channel is its hour.
    fn hour_coded_day() -> RgbImage {
        RgbImage::from_fn(240, 4, |x, _| Rgb([(x / 10) as u8, 0, 0]))
    }

    #[test]
    fn test_new_validates_hours() {
        assert!(Keogram::new(hour_coded_day(), 0.0, 24.0).is_ok());
        assert!(Keogram::new(hour_coded_day(), 12.0, 8.0).is_err());
        assert!(Keogram::new(hour_coded_day(), 0.0, 25.0).is_err());
    }

    #[test]
    fn test_crop_full_day() {
        let keo = Keogram::full_day(hour_coded_day());

        let cropped = keo.crop(8.0, 12.0);
        assert_eq!(cropped.image().dimensions(), (40, 4));
        assert_eq!(cropped.image().get_pixel(0, 0)[0], 8);
        assert_eq!(cropped.image().get_pixel(39, 0)[0], 11);
        assert_eq!((cropped.start_hour(), cropped.end_hour()), (8.0, 12.0));

        let whole = keo.crop(0.0, 24.0);
        assert_eq!(whole.image().dimensions(), (240, 4));
    }

    #[test]
    fn test_crop_partial_and_clamped() {
        let keo = Keogram::full_day(hour_coded_day()).crop(8.0, 12.0);

        let inner = keo.crop(9.0, 10.0);
        assert_eq!(inner.image().dimensions(), (10, 4));
        assert_eq!(inner.image().get_pixel(0, 0)[0], 9);

        let clamped = keo.crop(6.0, 14.0);
        assert_eq!(clamped.image().width(), 40);
        assert_eq!((clamped.start_hour(), clamped.end_hour()), (8.0, 12.0));
    }

    #[test]
    fn test_write_png_leaves_only_the_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.png");

        write_png(&hour_coded_day(), &path).unwrap();

        let back = open_rgb(&path).unwrap();
        assert_eq!(back, hour_coded_day());

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
