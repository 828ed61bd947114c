//! Frame files on disk: naming convention and PNG conversion.
//!
//! A capture directory holds three parallel sets of frames named
//! `<prefix><NN>.png` — `vl` for visible light, `ir` for infrared, `mx`
//! for the mixed overlay — with a two-digit zero-padded index, plus the
//! `info.json` metadata record. Pixel data crosses this boundary once
//! in each direction: PNGs decode to BGR [`Array3<u8>`] buffers and
//! back.

use std::{fmt, fs, path::Path};

use image::{Rgb, RgbImage};
use lazy_static::lazy_static;
use ndarray::Array3;
use regex::Regex;
use thiserror::Error;

/// Which of the three per-capture image sets a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Visible,
    Infrared,
    Mixed,
}

impl FrameKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Visible => "vl",
            FrameKind::Infrared => "ir",
            FrameKind::Mixed => "mx",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "vl" => Some(FrameKind::Visible),
            "ir" => Some(FrameKind::Infrared),
            "mx" => Some(FrameKind::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// `ir07.png`, `vl23.png`, ...
pub fn frame_file_name(kind: FrameKind, index: usize) -> String {
    format!("{}{:02}.png", kind.prefix(), index)
}

/// Inverse of [`frame_file_name`]. Anything else returns `None`.
pub fn parse_frame_file_name(name: &str) -> Option<(FrameKind, usize)> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^(vl|ir|mx)(\d{2})\.png$").unwrap();
    }
    let caps = RE.captures(name)?;
    let kind = FrameKind::from_prefix(caps.get(1)?.as_str())?;
    let index = caps.get(2)?.as_str().parse().ok()?;
    Some((kind, index))
}

#[derive(Debug, Error)]
pub enum FrameIoError {
    #[error("could not read directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("missing frame file `{0}`")]
    MissingFrame(String),

    #[error("`{kind}` frames are not contiguous: missing index {index}")]
    FrameGap { kind: FrameKind, index: usize },

    #[error("expected a 3-channel BGR buffer, got {0} channels")]
    BadShape(usize),
}

/// Decode a PNG into a BGR buffer of shape `(height, width, 3)`.
pub fn read_frame(path: &Path) -> Result<Array3<u8>, FrameIoError> {
    let rgb = image::open(path)?.to_rgb8();
    let (wid, ht) = rgb.dimensions();
    let mut out = Array3::zeros((ht as usize, wid as usize, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let Rgb([r, g, b]) = *pixel;
        out[(y as usize, x as usize, 0)] = b;
        out[(y as usize, x as usize, 1)] = g;
        out[(y as usize, x as usize, 2)] = r;
    }
    Ok(out)
}

/// Encode a BGR buffer as a PNG (format chosen from the extension).
pub fn write_frame(path: &Path, frame: &Array3<u8>) -> Result<(), FrameIoError> {
    let (ht, wid, channels) = frame.dim();
    if channels != 3 {
        return Err(FrameIoError::BadShape(channels));
    }
    let mut rgb = RgbImage::new(wid as u32, ht as u32);
    for (x, y, pixel) in rgb.enumerate_pixels_mut() {
        *pixel = Rgb([
            frame[(y as usize, x as usize, 2)],
            frame[(y as usize, x as usize, 1)],
            frame[(y as usize, x as usize, 0)],
        ]);
    }
    rgb.save(path)?;
    Ok(())
}

/// Read frames `0..count` of one kind from a capture directory, in
/// index order.
pub fn read_frames(
    dir: &Path,
    kind: FrameKind,
    count: usize,
) -> Result<Vec<Array3<u8>>, FrameIoError> {
    (0..count)
        .map(|index| {
            let path = dir.join(frame_file_name(kind, index));
            if !path.exists() {
                return Err(FrameIoError::MissingFrame(
                    path.to_string_lossy().into_owned(),
                ));
            }
            read_frame(&path)
        })
        .collect()
}

/// Count the frames of one kind present in a directory, verifying the
/// indices run contiguously from zero.
pub fn count_frames(dir: &Path, kind: FrameKind) -> Result<usize, FrameIoError> {
    let mut indices: Vec<usize> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|entry| {
            let name = entry.file_name();
            parse_frame_file_name(&name.to_string_lossy())
                .filter(|(k, _)| *k == kind)
                .map(|(_, index)| index)
        })
        .collect();
    indices.sort_unstable();

    for (expected, &index) in indices.iter().enumerate() {
        if index != expected {
            return Err(FrameIoError::FrameGap {
                kind,
                index: expected,
            });
        }
    }
    Ok(indices.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_file_name(FrameKind::Infrared, 7), "ir07.png");
        assert_eq!(frame_file_name(FrameKind::Visible, 23), "vl23.png");
        assert_eq!(frame_file_name(FrameKind::Mixed, 0), "mx00.png");
    }

    #[test]
    fn frame_names_round_trip() {
        for kind in [FrameKind::Visible, FrameKind::Infrared, FrameKind::Mixed] {
            for index in [0usize, 9, 10, 44] {
                let name = frame_file_name(kind, index);
                assert_eq!(parse_frame_file_name(&name), Some((kind, index)));
            }
        }
    }

    #[test]
    fn parse_rejects_foreign_names() {
        assert_eq!(parse_frame_file_name("info.json"), None);
        assert_eq!(parse_frame_file_name("ir7.png"), None);
        assert_eq!(parse_frame_file_name("xx07.png"), None);
        assert_eq!(parse_frame_file_name("ir007.png"), None);
    }
}
