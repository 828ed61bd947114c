//! Snap drifted panoramas back onto a palette, and convert images
//! between palettes.
//!
//! Stitching blends pixels, so a panorama assembled from
//! palette-exact frames comes out with colors slightly off the ramp.
//! [`snap_to_palette`] corrects that; [`change_palette`] re-colors a
//! palette-exact image onto a different ramp.

use std::collections::HashMap;

use itertools::iproduct;
use ndarray::Array3;
use thiserror::Error;

use crate::{
    color::Color,
    palette::{identify, Palette},
};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not identify the image's palette; supply one explicitly")]
    UnknownPalette,
}

/// Replace every pixel with its nearest entry in `palette`.
///
/// Distinct colors are resolved once through a cache and scattered
/// back by position; a panorama holds hundreds of thousands of pixels
/// but only a few dozen distinct colors. Idempotent: snapping an
/// already-snapped image changes nothing.
pub fn snap_to_palette(image: &Array3<u8>, palette: &Palette) -> Array3<u8> {
    let mut matches: HashMap<Color, Color> = HashMap::with_capacity(palette.len());
    remap_pixels(image, |raw| {
        *matches.entry(raw).or_insert_with(|| palette.nearest(raw))
    })
}

/// Re-color a palette-exact image onto `target`.
///
/// The image's current palette is identified from its pixels; when
/// identification fails (stitched-but-unsnapped input, or an unknown
/// ramp) the caller gets [`ConvertError::UnknownPalette`] and should
/// fall back to [`remap`] with an explicit source palette. Lookups
/// after identification are exact, never nearest-color.
pub fn change_palette(
    image: &Array3<u8>,
    known: &[Palette],
    target: &Palette,
) -> Result<Array3<u8>, ConvertError> {
    let source = identify(image, known).ok_or(ConvertError::UnknownPalette)?;
    Ok(remap(image, source, target))
}

/// Re-color an image from `source` onto `target` by ramp position.
///
/// When the palettes differ in length the shorter color list is
/// stretched to the longer one (see [`stretch`]) so a 1:1 index
/// correspondence exists. Colors not on the source ramp pass through
/// unchanged (identification can succeed before every pixel has been
/// scanned).
pub fn remap(image: &Array3<u8>, source: &Palette, target: &Palette) -> Array3<u8> {
    let mut old = source.colors().to_vec();
    let mut new = target.colors().to_vec();
    if old.len() < new.len() {
        old = stretch(&old, new.len());
    } else if new.len() < old.len() {
        new = stretch(&new, old.len());
    }

    // Duplicate keys from stretching resolve to the last occurrence,
    // keeping the hottest block of a repeated color authoritative.
    let old_to_new: HashMap<Color, Color> =
        old.iter().copied().zip(new.iter().copied()).collect();

    remap_pixels(image, |raw| old_to_new.get(&raw).copied().unwrap_or(raw))
}

/// Stretch an ordered list to `target_len` by repeating each element in
/// blocks of `k = round(target_len / len)`.
///
/// Leftover trailing slots (when the division isn't even) repeat the
/// last element, so the tail block ends up slightly longer than the
/// rest. That asymmetry is accepted: it keeps blocks in source order
/// and the ends of the ramp anchored, which is all the index
/// correspondence needs.
pub fn stretch<T: Copy>(values: &[T], target_len: usize) -> Vec<T> {
    if values.is_empty() || target_len == 0 {
        return Vec::new();
    }
    let k = ((target_len as f64 / values.len() as f64).round() as usize).max(1);
    let blocks = target_len / k;

    let mut out = Vec::with_capacity(target_len);
    for i in 0..blocks {
        let value = values[i.min(values.len() - 1)];
        out.extend(std::iter::repeat(value).take(k));
    }
    let last = values[values.len() - 1];
    while out.len() < target_len {
        out.push(last);
    }
    out
}

fn remap_pixels<F: FnMut(Color) -> Color>(image: &Array3<u8>, mut f: F) -> Array3<u8> {
    let (ht, wid, _) = image.dim();
    let mut out = Array3::zeros((ht, wid, 3));
    for (row, col) in iproduct!(0..ht, 0..wid) {
        let raw = Color::new(
            image[(row, col, 0)],
            image[(row, col, 1)],
            image[(row, col, 2)],
        );
        let mapped = f(raw);
        out[(row, col, 0)] = mapped.b;
        out[(row, col, 1)] = mapped.g;
        out[(row, col, 2)] = mapped.r;
    }
    out
}
