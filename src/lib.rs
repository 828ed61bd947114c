//! Library to build thermal panoramas whose colors encode temperature
//! consistently across the whole scene.
//!
//! Thermal cameras color-map every captured frame against that frame's
//! own temperature extremes, so the same orange means 25 °C in one
//! frame and 140 °C in the next. Stitching such frames produces a
//! panorama whose colors are meaningless. This crate provides the
//! color pipeline that fixes it:
//!
//! 1. [Rescale](rescale::Rescaler) each frame from its local
//!    temperature-to-color scale onto one global scale derived from the
//!    extremes of the whole run (with [outlier
//!    correction](extremes::correct_outliers) for saturated frames);
//! 2. hand the rescaled frames to an external
//!    [stitcher](stitch::Stitcher);
//! 3. [snap](convert::snap_to_palette) the composited panorama's
//!    drifted colors back onto the palette, and optionally
//!    [re-color](convert::change_palette) it onto a different one.
//!
//! # Usage
//!
//! A capture directory holds `ir<NN>.png` frames plus an `info.json`
//! with per-frame temperature extremes (see [`extremes::RunInfo`]).
//!
//! ```rust,no_run
//! # fn run() -> anyhow::Result<()> {
//! use std::path::Path;
//! use irpano::{
//!     extremes::RunInfo,
//!     io::{read_frames, FrameKind},
//!     palette::Palette,
//!     rescale::{RescaleOptions, Rescaler},
//! };
//!
//! let palette = Palette::load_path(Path::new("palettes/iron.pal"))?;
//! let info = RunInfo::from_path(Path::new("pano-01/info.json"))?;
//! let extremes = info.frame_extremes()?;
//! let frames = read_frames(Path::new("pano-01"), FrameKind::Infrared, extremes.len())?;
//!
//! let options = RescaleOptions { outlier_threshold: Some(150.) };
//! let rescaler = Rescaler::new(extremes, palette, &options)?;
//! let rescaled = rescaler.rescale_all(&frames)?;
//! # Ok(())
//! # }
//! ```
//!
//! After stitching, correct the palette drift the blender introduced:
//!
//! ```rust,no_run
//! # fn run(pano: ndarray::Array3<u8>) -> anyhow::Result<()> {
//! use std::path::Path;
//! use irpano::{convert::snap_to_palette, palette::Palette};
//!
//! let palette = Palette::load_path(Path::new("palettes/iron.pal"))?;
//! let clean = snap_to_palette(&pano, &palette);
//! # Ok(())
//! # }
//! ```
//!
//! Buffers are [`ndarray::Array3<u8>`] in `(height, width, channel)`
//! layout with BGR channel order; [`io`] converts to and from PNG at
//! the boundary.

pub mod color;
pub mod convert;
pub mod extremes;
pub mod io;
pub mod palette;
pub mod rescale;
pub mod scale;
pub mod stitch;

pub mod cli;

pub use crate::color::Color;
pub use crate::palette::Palette;
pub use crate::rescale::{RescaleOptions, Rescaler};
pub use crate::scale::TemperatureColorMap;
