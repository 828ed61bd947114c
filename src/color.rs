//! The BGR color value type used throughout the crate.
//!
//! Frames come off the camera as 8-bit, 3-channel rasters in BGR
//! channel order, and the same order is kept everywhere internally.
//! `Color` is a plain value type so it can double as a hash-map key in
//! the per-frame pixel caches.

use std::fmt;

/// An 8-bit color in BGR channel order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Color { b, g, r }
    }

    /// Convert a palette entry from the camera's native YCbCr encoding.
    ///
    /// The coefficients are the ones the camera vendor uses for its
    /// `.pal` files; each output channel is clamped to `[0, 255]`.
    /// Note that the `cb` component feeds the red channel and `cr` the
    /// blue one, following the component order of the palette files
    /// themselves.
    pub fn from_ycbcr(y: f64, cb: f64, cr: f64) -> Self {
        let r = y + 1.40200 * (cb - 128.);
        let g = y - 0.34414 * (cr - 128.) - 0.71414 * (cb - 128.);
        let b = y + 1.77200 * (cr - 128.);
        Color {
            b: clamp_channel(b),
            g: clamp_channel(g),
            r: clamp_channel(r),
        }
    }

    /// Sum of absolute per-channel differences.
    ///
    /// Cheap and good enough to undo the drift that lossy encode /
    /// decode cycles introduce; the global ramp never has two entries
    /// close enough for the metric to matter.
    pub fn distance(&self, other: &Color) -> u32 {
        let d = |a: u8, b: u8| (a as i32 - b as i32).abs() as u32;
        d(self.b, other.b) + d(self.g, other.g) + d(self.r, other.r)
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }
}

impl From<[u8; 3]> for Color {
    fn from(bgr: [u8; 3]) -> Self {
        Color::new(bgr[0], bgr[1], bgr[2])
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(b={}, g={}, r={})", self.b, self.g, self.r)
    }
}

fn clamp_channel(val: f64) -> u8 {
    // Truncation, not rounding: matches the camera vendor's own tables.
    val.max(0.).min(255.) as u8
}
