use image::{
    imageops::{self, FilterType},
    Rgb, RgbImage,
};
use log::warn;

use crate::errors::KeoDataErr;

/// What to do when the slices being stitched differ in height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightPolicy {
    /// Keep every slice as is and pad the short ones with black at the bottom.
    Lenient,
    /// Scale every slice to the height of the shortest one, keeping its aspect ratio.
    Resize,
}

/// Concatenate hourly slices left to right in ascending hour order.
///
/// Hours missing between the first and last slice are filled with black columns as wide as the
/// slice before the gap, so the result spans `[first, last + 1)` at a constant rate.
pub fn stitch_horizontal(
    slices: Vec<(u8, RgbImage)>,
    policy: HeightPolicy,
) -> Result<RgbImage, KeoDataErr> {
    let mut slices = slices;
    slices.sort_by_key(|(hour, _)| *hour);

    let min_height = slices
        .iter()
        .map(|(_, img)| img.height())
        .min()
        .ok_or(KeoDataErr::NotEnoughData)?;
    let max_height = slices
        .iter()
        .map(|(_, img)| img.height())
        .max()
        .ok_or(KeoDataErr::NotEnoughData)?;

    let slices: Vec<(u8, RgbImage)> = if min_height == max_height {
        slices
    } else {
        match policy {
            HeightPolicy::Lenient => {
                warn!(
                    "Slice heights differ ({} to {} px), padding to {} px",
                    min_height, max_height, max_height
                );
                slices
            }
            HeightPolicy::Resize => {
                if min_height == 0 {
                    return Err(KeoDataErr::NotEnoughData);
                }
                slices
                    .into_iter()
                    .map(|(hour, img)| (hour, scale_to_height(img, min_height)))
                    .collect()
            }
        }
    };

    // (x offset, image) for each slice, with missing hours skipped over
    let mut placed: Vec<(u32, &RgbImage)> = Vec::with_capacity(slices.len());
    let mut width: u32 = 0;
    let mut prev: Option<(u8, u32)> = None;
    for (hour, img) in &slices {
        if let Some((prev_hour, prev_width)) = prev {
            let missing = u32::from(hour.saturating_sub(prev_hour)).saturating_sub(1);
            if missing > 0 {
                warn!(
                    "No slice for {} hour(s) before {:02}, filling with black",
                    missing, hour
                );
                width += missing * prev_width;
            }
        }
        placed.push((width, img));
        width += img.width();
        prev = Some((*hour, img.width()));
    }

    let height = slices.iter().map(|(_, img)| img.height()).max().unwrap_or(0);

    let mut stitched = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    for (x_offset, img) in placed {
        imageops::replace(&mut stitched, img, i64::from(x_offset), 0);
    }

    Ok(stitched)
}

fn scale_to_height(img: RgbImage, height: u32) -> RgbImage {
    if img.height() == height {
        return img;
    }

    let scale = f64::from(height) / f64::from(img.height());
    let width = ((f64::from(img.width()) * scale).round() as u32).max(1);
    imageops::resize(&img, width, height, FilterType::CatmullRom)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
