//! Rescale every frame's colors onto the run-wide temperature scale.
//!
//! Each frame comes off the camera color-mapped against its *own*
//! temperature extremes, so the same color means a different
//! temperature in every frame. The [`Rescaler`] reconciles them: it
//! derives the run-wide extremes from the (outlier-corrected) per-frame
//! ones, builds one global [`TemperatureColorMap`], and repaints each
//! frame so that color encodes temperature consistently across the
//! whole panorama.
//!
//! Construction order is what makes this safe: a `Rescaler` applies the
//! outlier filter before it derives the global extremes, and owns the
//! corrected extremes immutably afterwards, so the global scale can
//! never be computed from uncorrected values or go stale.

use std::collections::HashMap;

use itertools::iproduct;
use ndarray::Array3;
use thiserror::Error;

use crate::{
    color::Color,
    extremes::{correct_outliers, FrameExtremes, OutlierError},
    palette::Palette,
    scale::{ScaleError, TemperatureColorMap},
};

#[derive(Debug, Error)]
pub enum RescaleError {
    #[error(transparent)]
    Outlier(#[from] OutlierError),

    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("no frame extremes supplied")]
    NoFrames,

    #[error("frame index {index} out of range: run has {count} frames")]
    UnknownFrame { index: usize, count: usize },

    #[error("frame {index} has {channels} channels, expected 3 (BGR)")]
    BadChannelCount { index: usize, channels: usize },
}

#[derive(Debug, Clone, Default)]
pub struct RescaleOptions {
    /// Highs above this are treated as sensor saturation and corrected
    /// by [`correct_outliers`] before the global scale is derived.
    /// `None` disables the correction.
    pub outlier_threshold: Option<f64>,
}

/// Repaints frames from their local color scale onto the global one.
#[derive(Debug)]
pub struct Rescaler {
    palette: Palette,
    extremes: Vec<FrameExtremes>,
    global: TemperatureColorMap,
}

impl Rescaler {
    /// Correct outliers (when configured), derive the global extremes,
    /// and build the global map for the run.
    pub fn new(
        extremes: Vec<FrameExtremes>,
        palette: Palette,
        options: &RescaleOptions,
    ) -> Result<Self, RescaleError> {
        if extremes.is_empty() {
            return Err(RescaleError::NoFrames);
        }
        let extremes = match options.outlier_threshold {
            Some(threshold) => correct_outliers(&extremes, threshold)?,
            None => extremes,
        };

        let low = extremes.iter().map(|e| e.lowest).fold(f64::INFINITY, f64::min);
        let high = extremes
            .iter()
            .map(|e| e.highest)
            .fold(f64::NEG_INFINITY, f64::max);
        let global = TemperatureColorMap::build(low, high, &palette)?;

        Ok(Rescaler {
            palette,
            extremes,
            global,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.extremes.len()
    }

    /// The corrected extremes the global scale was derived from.
    pub fn extremes(&self) -> &[FrameExtremes] {
        &self.extremes
    }

    pub fn global_map(&self) -> &TemperatureColorMap {
        &self.global
    }

    /// Repaint one frame onto the global scale.
    ///
    /// The local map's temperatures rarely land exactly on global keys,
    /// so each local key is bridged to its nearest global one first;
    /// every pixel then goes raw color → nearest palette entry →
    /// bridged global temperature → global color. Identical raw colors
    /// within a frame always resolve to the identical output color (the
    /// per-frame cache guarantees it), and the output buffer has the
    /// input's dimensions.
    pub fn rescale(&self, frame_index: usize, frame: &Array3<u8>) -> Result<Array3<u8>, RescaleError> {
        let extremes = *self
            .extremes
            .get(frame_index)
            .ok_or(RescaleError::UnknownFrame {
                index: frame_index,
                count: self.extremes.len(),
            })?;

        let (ht, wid, channels) = frame.dim();
        if channels != 3 {
            return Err(RescaleError::BadChannelCount {
                index: frame_index,
                channels,
            });
        }

        let local = TemperatureColorMap::build(extremes.lowest, extremes.highest, &self.palette)?;

        // Bridge: palette index i holds the frame's i-th local
        // temperature; match each onto the global scale once, up front.
        let bridge: Vec<usize> = local
            .temperatures()
            .iter()
            .map(|&t| self.global.nearest_index(t))
            .collect();

        // Frames hold far fewer distinct colors than pixels, so resolve
        // each distinct color once and reuse it.
        let mut cache: HashMap<Color, Color> = HashMap::with_capacity(self.palette.len());

        let mut out = Array3::zeros((ht, wid, 3));
        for (row, col) in iproduct!(0..ht, 0..wid) {
            let raw = Color::new(
                frame[(row, col, 0)],
                frame[(row, col, 1)],
                frame[(row, col, 2)],
            );
            let resolved = *cache.entry(raw).or_insert_with(|| {
                let palette_index = self.palette.nearest_index(raw);
                self.global.color_at(bridge[palette_index])
            });
            out[(row, col, 0)] = resolved.b;
            out[(row, col, 1)] = resolved.g;
            out[(row, col, 2)] = resolved.r;
        }
        Ok(out)
    }

    /// Rescale a whole run, one rayon task per frame. The global map is
    /// read-only, so frames are fully independent of each other.
    pub fn rescale_all(&self, frames: &[Array3<u8>]) -> Result<Vec<Array3<u8>>, RescaleError> {
        use rayon::prelude::*;
        frames
            .par_iter()
            .enumerate()
            .map(|(i, frame)| self.rescale(i, frame))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_palette() -> Palette {
        Palette::from_colors(
            "grey",
            vec![
                Color::new(0, 0, 0),
                Color::new(85, 85, 85),
                Color::new(170, 170, 170),
                Color::new(255, 255, 255),
            ],
        )
        .unwrap()
    }

    fn frame_of(colors: &[Color]) -> Array3<u8> {
        let mut img = Array3::zeros((1, colors.len(), 3));
        for (i, c) in colors.iter().enumerate() {
            img[(0, i, 0)] = c.b;
            img[(0, i, 1)] = c.g;
            img[(0, i, 2)] = c.r;
        }
        img
    }

    fn pixel(img: &Array3<u8>, col: usize) -> Color {
        Color::new(img[(0, col, 0)], img[(0, col, 1)], img[(0, col, 2)])
    }

    #[test]
    fn hottest_pixels_land_where_their_global_temperature_says() {
        // Frame 0 spans [0, 30], frame 1 spans [10, 40]; the global
        // scale is [0, 40] with keys 0, 13.33, 26.67, 40. Frame 0's
        // hottest color means 30 degrees, which bridges to the 26.67
        // key; frame 1's hottest means 40 and stays at the top.
        let extremes = vec![FrameExtremes::new(0., 30.), FrameExtremes::new(10., 40.)];
        let rescaler =
            Rescaler::new(extremes, grey_palette(), &RescaleOptions::default()).unwrap();

        let white = Color::new(255, 255, 255);
        let out_a = rescaler.rescale(0, &frame_of(&[white])).unwrap();
        let out_b = rescaler.rescale(1, &frame_of(&[white])).unwrap();

        assert_eq!(pixel(&out_a, 0), Color::new(170, 170, 170));
        assert_eq!(pixel(&out_b, 0), Color::new(255, 255, 255));
    }

    #[test]
    fn coldest_pixel_of_the_coldest_frame_keeps_the_ramp_bottom() {
        let extremes = vec![FrameExtremes::new(0., 30.), FrameExtremes::new(10., 40.)];
        let rescaler =
            Rescaler::new(extremes, grey_palette(), &RescaleOptions::default()).unwrap();
        let out = rescaler.rescale(0, &frame_of(&[Color::new(0, 0, 0)])).unwrap();
        assert_eq!(pixel(&out, 0), Color::new(0, 0, 0));
    }

    #[test]
    fn identical_raw_colors_resolve_identically() {
        let extremes = vec![FrameExtremes::new(5., 25.)];
        let rescaler =
            Rescaler::new(extremes, grey_palette(), &RescaleOptions::default()).unwrap();
        // Slightly drifted copies of the same color, plus exact repeats.
        let drifted = Color::new(168, 171, 170);
        let out = rescaler
            .rescale(0, &frame_of(&[drifted, drifted, drifted]))
            .unwrap();
        assert_eq!(pixel(&out, 0), pixel(&out, 1));
        assert_eq!(pixel(&out, 1), pixel(&out, 2));
    }

    #[test]
    fn output_shape_matches_input() {
        let extremes = vec![FrameExtremes::new(0., 10.)];
        let rescaler =
            Rescaler::new(extremes, grey_palette(), &RescaleOptions::default()).unwrap();
        let frame = Array3::zeros((4, 7, 3));
        let out = rescaler.rescale(0, &frame).unwrap();
        assert_eq!(out.dim(), (4, 7, 3));
    }

    #[test]
    fn outlier_threshold_reshapes_the_global_scale() {
        // With the 152 left in, the global high would be 152; the
        // filter pulls it back to 20, so both frames share [10, 20].
        let extremes = vec![FrameExtremes::new(10., 20.), FrameExtremes::new(15., 152.)];
        let options = RescaleOptions {
            outlier_threshold: Some(150.),
        };
        let rescaler = Rescaler::new(extremes, grey_palette(), &options).unwrap();
        assert_eq!(rescaler.extremes()[1].highest, 20.);
        assert_eq!(rescaler.global_map().temperature_at(3), 20.);
    }

    #[test]
    fn unknown_frame_index_is_rejected() {
        let extremes = vec![FrameExtremes::new(0., 10.)];
        let rescaler =
            Rescaler::new(extremes, grey_palette(), &RescaleOptions::default()).unwrap();
        assert!(matches!(
            rescaler.rescale(3, &Array3::zeros((1, 1, 3))),
            Err(RescaleError::UnknownFrame { index: 3, count: 1 })
        ));
    }

    #[test]
    fn degenerate_frame_range_is_rejected() {
        let extremes = vec![FrameExtremes::new(10., 10.)];
        let err = Rescaler::new(extremes, grey_palette(), &RescaleOptions::default())
            .unwrap_err();
        assert!(matches!(err, RescaleError::Scale(ScaleError::InvalidRange { .. })));
    }

    #[test]
    fn rescale_all_matches_per_frame_calls() {
        let extremes = vec![FrameExtremes::new(0., 30.), FrameExtremes::new(10., 40.)];
        let rescaler =
            Rescaler::new(extremes, grey_palette(), &RescaleOptions::default()).unwrap();
        let frames = vec![
            frame_of(&[Color::new(85, 85, 85), Color::new(255, 255, 255)]),
            frame_of(&[Color::new(0, 0, 0), Color::new(170, 170, 170)]),
        ];
        let all = rescaler.rescale_all(&frames).unwrap();
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(all[i], rescaler.rescale(i, frame).unwrap());
        }
    }
}
