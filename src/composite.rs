//! Fusing single wavelength all-sky frames into RGB composites.
//!
//! Frames are matched to a reference wavelength by time. Each frame is min-max normalized on its
//! own and written into the channel its wavelength maps to.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{Duration, NaiveDateTime};
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use log::{debug, info};
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::{archive::files_in, errors::KeoDataErr, names::AsiFrameName};

/// An output color channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, AsRefStr)]
#[allow(missing_docs)]
pub enum Channel {
    #[strum(to_string = "R", serialize = "red")]
    Red,
    #[strum(to_string = "G", serialize = "green")]
    Green,
    #[strum(to_string = "B", serialize = "blue")]
    Blue,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Which wavelength goes in which channel, which wavelength the others are matched against, and
/// how far apart in time matched frames may be.
#[derive(Clone, Debug)]
pub struct ChannelMap {
    assignments: Vec<(String, Channel)>,
    reference: String,
    tolerance: Duration,
}

impl Default for ChannelMap {
    fn default() -> Self {
        ChannelMap {
            assignments: vec![
                ("0630".to_owned(), Channel::Red),
                ("0558".to_owned(), Channel::Green),
                ("0428".to_owned(), Channel::Blue),
            ],
            reference: "0558".to_owned(),
            tolerance: Duration::seconds(20),
        }
    }
}

impl ChannelMap {
    /// Build a custom map. The reference must be one of the assigned wavelengths and no two
    /// wavelengths may share a channel.
    pub fn new(
        assignments: Vec<(String, Channel)>,
        reference: &str,
        tolerance: Duration,
    ) -> Result<Self, KeoDataErr> {
        if !assignments.iter().any(|(wl, _)| wl == reference) {
            return Err(KeoDataErr::MissingWavelength(reference.to_owned()));
        }

        for (i, (_, channel)) in assignments.iter().enumerate() {
            if assignments[..i].iter().any(|(_, other)| other == channel) {
                return Err(KeoDataErr::GeneralError(format!(
                    "channel {} assigned twice",
                    channel.as_ref()
                )));
            }
        }

        Ok(ChannelMap {
            assignments,
            reference: reference.to_owned(),
            tolerance,
        })
    }

    /// Wavelengths in the map, in the order they were assigned.
    pub fn wavelengths(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(wl, _)| wl.as_str())
    }

    /// The channel a wavelength is written to.
    pub fn channel_of(&self, wavelength: &str) -> Option<Channel> {
        self.assignments
            .iter()
            .find(|(wl, _)| wl == wavelength)
            .map(|(_, ch)| *ch)
    }

    /// The wavelength other frames are matched against.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Largest allowed time difference between a matched frame and the reference frame.
    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }
}

/// Frames found in a directory, by wavelength and sorted by time.
#[derive(Clone, Debug, Default)]
pub struct FrameIndex {
    by_wavelength: BTreeMap<String, Vec<(NaiveDateTime, PathBuf)>>,
}

impl FrameIndex {
    /// Index the frames directly inside `dir`. Files not named like frames are skipped.
    pub fn scan(dir: &Path) -> Self {
        let frames = files_in(dir).into_iter().filter_map(|path| {
            let parsed = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<AsiFrameName>().ok());
            if parsed.is_none() {
                debug!("Skipping non-frame file {}", path.display());
            }
            parsed.map(|name| (name, path))
        });

        Self::from_frames(frames)
    }

    /// Index already parsed frames.
    pub fn from_frames(frames: impl IntoIterator<Item = (AsiFrameName, PathBuf)>) -> Self {
        let mut by_wavelength: BTreeMap<String, Vec<(NaiveDateTime, PathBuf)>> = BTreeMap::new();

        for (name, path) in frames {
            by_wavelength
                .entry(name.wavelength)
                .or_default()
                .push((name.time, path));
        }

        for frames in by_wavelength.values_mut() {
            frames.sort();
        }

        FrameIndex { by_wavelength }
    }

    /// Frames for one wavelength, sorted by time.
    pub fn frames(&self, wavelength: &str) -> &[(NaiveDateTime, PathBuf)] {
        self.by_wavelength
            .get(wavelength)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of frames per wavelength.
    pub fn counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_wavelength
            .iter()
            .map(|(wl, frames)| (wl.as_str(), frames.len()))
    }
}

/// The record closest in time to `target` and its distance. Ties go to the earlier record.
pub fn find_nearest(
    target: NaiveDateTime,
    records: &[(NaiveDateTime, PathBuf)],
) -> Option<(NaiveDateTime, &Path, Duration)> {
    let mut best: Option<(NaiveDateTime, &Path, Duration)> = None;

    for (time, path) in records {
        let diff = if *time >= target {
            *time - target
        } else {
            target - *time
        };
        match best {
            Some((_, _, best_diff)) if diff >= best_diff => {}
            _ => best = Some((*time, path.as_path(), diff)),
        }
    }

    best
}

/// One frame per channel, matched to a reference frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Triplet {
    /// Time of the reference frame.
    pub reference_time: NaiveDateTime,
    /// (channel, wavelength, path) for each mapped wavelength.
    pub frames: Vec<(Channel, String, PathBuf)>,
}

/// Match every mapped wavelength to the reference frame at `reference_time`.
pub fn select_triplet(
    index: &FrameIndex,
    map: &ChannelMap,
    reference_time: NaiveDateTime,
) -> Result<Triplet, KeoDataErr> {
    let mut frames = vec![];

    for wavelength in map.wavelengths() {
        let (time, path, diff) = find_nearest(reference_time, index.frames(wavelength))
            .ok_or_else(|| KeoDataErr::MissingWavelength(wavelength.to_owned()))?;

        if diff > map.tolerance() {
            return Err(KeoDataErr::BeyondTolerance {
                wavelength: wavelength.to_owned(),
                seconds: diff.num_milliseconds() as f64 / 1000.0,
            });
        }

        info!(
            "Nearest {}: {} at {} ({:.1} s)",
            wavelength,
            path.display(),
            time,
            diff.num_milliseconds() as f64 / 1000.0
        );

        let channel = map
            .channel_of(wavelength)
            .ok_or(KeoDataErr::LogicError("wavelength without a channel"))?;
        frames.push((channel, wavelength.to_owned(), path.to_path_buf()));
    }

    Ok(Triplet {
        reference_time,
        frames,
    })
}

/// Min-max scale a grayscale frame to `[0, 1]`. A constant frame becomes all zeros.
pub fn normalize(frame: &GrayImage) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let (width, height) = frame.dimensions();
    let min = frame.pixels().map(|p| p[0]).min().unwrap_or(0);
    let max = frame.pixels().map(|p| p[0]).max().unwrap_or(0);

    if max <= min {
        return ImageBuffer::new(width, height);
    }

    let range = f32::from(max - min);
    ImageBuffer::from_fn(width, height, |x, y| {
        Luma([f32::from(frame.get_pixel(x, y)[0] - min) / range])
    })
}

/// Write normalized planes into their channels. Channels without a plane stay black.
pub fn fuse_channels(
    planes: &[(Channel, ImageBuffer<Luma<f32>, Vec<f32>>)],
) -> Result<RgbImage, KeoDataErr> {
    let (width, height) = planes
        .first()
        .map(|(_, plane)| plane.dimensions())
        .ok_or(KeoDataErr::NotEnoughData)?;

    for (_, plane) in planes {
        if plane.dimensions() != (width, height) {
            return Err(KeoDataErr::ShapeMismatch {
                expected: (width, height),
                found: plane.dimensions(),
            });
        }
    }

    let mut rgb = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    for (channel, plane) in planes {
        let idx = channel.index();
        for (out, value) in rgb.pixels_mut().zip(plane.pixels()) {
            out[idx] = (value[0].max(0.0).min(1.0) * 255.0) as u8;
        }
    }

    Ok(rgb)
}

/// Load, normalize and fuse the frames of a triplet.
pub fn composite(triplet: &Triplet) -> Result<RgbImage, KeoDataErr> {
    let planes = triplet
        .frames
        .iter()
        .map(|(channel, _, path)| -> Result<_, KeoDataErr> {
            Ok((*channel, normalize(&image::open(path)?.to_luma8())))
        })
        .collect::<Result<Vec<_>, KeoDataErr>>()?;

    fuse_channels(&planes)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 3)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap()
    }

    fn frame(wavelength: &str, offset_secs: i64) -> (AsiFrameName, PathBuf) {
        let name = AsiFrameName {
            station: "PFRR".to_owned(),
            time: t0() + Duration::seconds(offset_secs),
            wavelength: wavelength.to_owned(),
        };
        let path = PathBuf::from(name.to_string());
        (name, path)
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("R".parse::<Channel>().unwrap(), Channel::Red);
        assert_eq!("blue".parse::<Channel>().unwrap(), Channel::Blue);
        assert!("X".parse::<Channel>().is_err());
    }

    #[test]
    fn test_find_nearest() {
        let records: Vec<(NaiveDateTime, PathBuf)> = [-30i64, -5, 5, 40]
            .iter()
            .map(|&s| (t0() + Duration::seconds(s), PathBuf::from(format!("{}", s))))
            .collect();

        let (time, path, diff) = find_nearest(t0(), &records).unwrap();
        assert_eq!(time, t0() - Duration::seconds(5));
        assert_eq!(path, Path::new("-5"));
        assert_eq!(diff, Duration::seconds(5));

        assert!(find_nearest(t0(), &[]).is_none());
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let map = ChannelMap::default();

        let index = FrameIndex::from_frames(vec![
            frame("0558", 0),
            frame("0630", 20),
            frame("0428", -3),
        ]);
        let triplet = select_triplet(&index, &map, t0()).unwrap();
        assert_eq!(triplet.frames.len(), 3);

        let index = FrameIndex::from_frames(vec![
            frame("0558", 0),
            frame("0630", 21),
            frame("0428", -3),
        ]);
        match select_triplet(&index, &map, t0()) {
            Err(KeoDataErr::BeyondTolerance { wavelength, seconds }) => {
                assert_eq!(wavelength, "0630");
                assert_eq!(seconds, 21.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_wavelength() {
        let index = FrameIndex::from_frames(vec![frame("0558", 0), frame("0630", 2)]);
        match select_triplet(&index, &ChannelMap::default(), t0()) {
            Err(KeoDataErr::MissingWavelength(wl)) => assert_eq!(wl, "0428"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_channel_map_validation() {
        let tol = Duration::seconds(20);
        assert!(ChannelMap::new(vec![("0630".to_owned(), Channel::Red)], "0558", tol).is_err());
        assert!(ChannelMap::new(
            vec![
                ("0630".to_owned(), Channel::Red),
                ("0558".to_owned(), Channel::Red)
            ],
            "0558",
            tol
        )
        .is_err());
        assert_eq!(
            ChannelMap::default().channel_of("0630"),
            Some(Channel::Red)
        );
    }

    #[test]
    fn test_normalize() {
        let frame = GrayImage::from_fn(3, 1, |x, _| Luma([50 + 50 * x as u8]));
        let norm = normalize(&frame);
        assert_eq!(norm.get_pixel(0, 0)[0], 0.0);
        assert_eq!(norm.get_pixel(1, 0)[0], 0.5);
        assert_eq!(norm.get_pixel(2, 0)[0], 1.0);

        let flat = normalize(&GrayImage::from_pixel(4, 4, Luma([77])));
        assert!(flat.pixels().all(|p| p[0] == 0.0));
    }

    #[test]
    fn test_red_wavelength_only_in_red_channel() {
        let bright = ImageBuffer::from_pixel(2, 2, Luma([1.0f32]));
        let dark = ImageBuffer::from_pixel(2, 2, Luma([0.0f32]));

        let rgb = fuse_channels(&[
            (Channel::Red, bright),
            (Channel::Green, dark.clone()),
            (Channel::Blue, dark),
        ])
        .unwrap();

        assert!(rgb.pixels().all(|p| *p == Rgb([255, 0, 0])));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = ImageBuffer::from_pixel(2, 2, Luma([1.0f32]));
        let b = ImageBuffer::from_pixel(3, 2, Luma([1.0f32]));

        match fuse_channels(&[(Channel::Red, a), (Channel::Green, b)]) {
            Err(KeoDataErr::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, (2, 2));
                assert_eq!(found, (3, 2));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_scan_and_composite_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        for (wl, level) in &[("0630", 200u8), ("0558", 100), ("0428", 50)] {
            let mut img = GrayImage::from_pixel(4, 3, Luma([0]));
            img.put_pixel(1, 1, Luma([*level]));
            img.save(dir.path().join(format!("PFRR_20251103_020000_{}.png", wl)))
                .unwrap();
        }
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();

        let index = FrameIndex::scan(dir.path());
        assert_eq!(index.counts().count(), 3);

        let triplet = select_triplet(&index, &ChannelMap::default(), t0()).unwrap();
        let rgb = composite(&triplet).unwrap();
        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(*rgb.get_pixel(1, 1), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_each_wavelength_lands_in_its_channel() {
        let dir = tempfile::TempDir::new().unwrap();
        let lit = [("0630", (0u32, 0u32)), ("0558", (1, 1)), ("0428", (2, 2))];
        for (wl, (x, y)) in &lit {
            let mut img = GrayImage::from_pixel(3, 3, Luma([10]));
            img.put_pixel(*x, *y, Luma([180]));
            img.save(dir.path().join(format!("PFRR_20251103_020005_{}.png", wl)))
                .unwrap();
        }

        let index = FrameIndex::scan(dir.path());
        let map = ChannelMap::default();
        let (reference_time, _) = index.frames(map.reference())[0].clone();

        let triplet = select_triplet(&index, &map, reference_time).unwrap();
        let rgb = composite(&triplet).unwrap();

        assert_eq!(*rgb.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*rgb.get_pixel(1, 1), Rgb([0, 255, 0]));
        assert_eq!(*rgb.get_pixel(2, 2), Rgb([0, 0, 255]));
        assert_eq!(*rgb.get_pixel(2, 0), Rgb([0, 0, 0]));
    }
}
