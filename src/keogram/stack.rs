use image::{
    imageops::{self, FilterType},
    Rgb, RgbImage,
};
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};
use log::warn;

use crate::errors::KeoDataErr;

/// Options for stacking full day keograms into a monthly image.
#[derive(Clone, Debug)]
pub struct StackOptions {
    /// Every keogram is resized to `aspect` times as wide as it is tall.
    pub aspect: u32,
    /// Fill for keograms narrower than the widest.
    pub fill: Rgb<u8>,
    /// Hours UTC marked with vertical lines across the whole stack.
    pub reference_hours: Vec<f64>,
    /// Width of the reference lines in pixels.
    pub line_width: u32,
    /// Color of the reference lines.
    pub line_color: Rgb<u8>,
}

impl Default for StackOptions {
    fn default() -> Self {
        StackOptions {
            aspect: 10,
            fill: Rgb([0, 0, 0]),
            reference_hours: vec![6.0, 12.0],
            line_width: 10,
            line_color: Rgb([255, 255, 255]),
        }
    }
}

/// Column of a reference line for `hour` in an image covering a day `width` pixels wide.
pub fn reference_line_x(width: u32, hour: f64) -> u32 {
    let x = (f64::from(width) * hour / 24.0).floor();
    if x <= 0.0 {
        0
    } else {
        (x as u32).min(width.saturating_sub(1))
    }
}

/// Stack images top to bottom in the order given.
///
/// Each image is first resized to the aspect ratio of the options, images narrower than the
/// widest are padded on the right, then the reference lines are drawn over everything.
pub fn stack_vertical(images: &[RgbImage], opts: &StackOptions) -> Result<RgbImage, KeoDataErr> {
    let resized: Vec<RgbImage> = images
        .iter()
        .filter(|img| {
            let empty = img.width() == 0 || img.height() == 0;
            if empty {
                warn!("Skipping empty image in stack");
            }
            !empty
        })
        .map(|img| {
            let height = img.height();
            imageops::resize(img, opts.aspect.max(1) * height, height, FilterType::Lanczos3)
        })
        .collect();

    if resized.is_empty() {
        return Err(KeoDataErr::NotEnoughData);
    }

    let max_width = resized.iter().map(|img| img.width()).max().unwrap_or(0);
    let total_height: u32 = resized.iter().map(|img| img.height()).sum();

    let mut stacked = RgbImage::from_pixel(max_width, total_height, opts.fill);
    let mut y_offset: i64 = 0;
    for img in &resized {
        imageops::replace(&mut stacked, img, 0, y_offset);
        y_offset += i64::from(img.height());
    }

    if opts.line_width > 0 {
        for &hour in &opts.reference_hours {
            let x = reference_line_x(max_width, hour) as i32;
            let left = x - (opts.line_width / 2) as i32;
            let rect = Rect::at(left, 0).of_size(opts.line_width, total_height);
            draw_filled_rect_mut(&mut stacked, rect, opts.line_color);
        }
    }

    Ok(stacked)
}

/// Place `strip` to the left of `image` on a white background as tall as the taller of the two.
pub fn attach_left(strip: &RgbImage, image: &RgbImage) -> RgbImage {
    let width = strip.width() + image.width();
    let height = strip.height().max(image.height());

    let mut combo = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    imageops::replace(&mut combo, strip, 0, 0);
    imageops::replace(&mut combo, image, i64::from(strip.width()), 0);

    combo
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
