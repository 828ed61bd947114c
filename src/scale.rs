//! Temperature-to-color scales.
//!
//! A [`TemperatureColorMap`] ties a contiguous temperature interval to
//! a palette by subdividing `[low, high]` into `N - 1` equal steps and
//! assigning the i-th palette color to the i-th step. Every frame gets
//! a local map built from its own extremes, and the whole run shares a
//! single global map built from the run-wide extremes.

use thiserror::Error;

use crate::{color::Color, palette::Palette};

#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("invalid temperature range: low ({low}) must be strictly below high ({high})")]
    InvalidRange { low: f64, high: f64 },

    #[error("palette `{0}` is too short to span a temperature interval")]
    PaletteTooShort(String),
}

/// A bijective map between evenly spaced temperatures and the ordered
/// colors of a palette.
#[derive(Debug, Clone)]
pub struct TemperatureColorMap {
    temperatures: Vec<f64>,
    colors: Vec<Color>,
}

impl TemperatureColorMap {
    /// Subdivide `[low, high]` over the palette. The first temperature
    /// maps to the first palette entry and `high` to the last.
    pub fn build(low: f64, high: f64, palette: &Palette) -> Result<Self, ScaleError> {
        if palette.len() < 2 {
            // Unreachable for palettes built by this crate; loading
            // already enforces the minimum length.
            return Err(ScaleError::PaletteTooShort(palette.name().to_string()));
        }
        if high <= low {
            return Err(ScaleError::InvalidRange { low, high });
        }

        let n = palette.len();
        let step = (high - low) / (n - 1) as f64;
        let temperatures = (0..n).map(|i| low + i as f64 * step).collect();
        Ok(TemperatureColorMap {
            temperatures,
            colors: palette.colors().to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    /// The temperature keys, in ascending order.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn temperature_at(&self, index: usize) -> f64 {
        self.temperatures[index]
    }

    pub fn color_at(&self, index: usize) -> Color {
        self.colors[index]
    }

    /// Index of the key nearest to `t`; ties go to the lower
    /// temperature (keys ascend, so the first minimum wins).
    pub fn nearest_index(&self, t: f64) -> usize {
        nearest_index(t, &self.temperatures)
    }
}

fn nearest_index(t: f64, candidates: &[f64]) -> usize {
    let mut best = 0;
    let mut best_diff = f64::INFINITY;
    for (i, &c) in candidates.iter().enumerate() {
        let diff = (c - t).abs();
        if diff < best_diff {
            best_diff = diff;
            best = i;
        }
    }
    best
}

/// The candidate value closest to `t`. Ties break toward the lowest
/// candidate value when `candidates` ascend.
pub fn nearest_temperature(t: f64, candidates: &[f64]) -> f64 {
    candidates[nearest_index(t, candidates)]
}
