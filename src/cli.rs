//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::path::Path;

use anyhow::{ensure, Context, Result};
pub use clap::{App, Arg};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use ndarray::Array3;
use rayon::prelude::*;

use crate::{
    extremes::{FrameExtremes, RunInfo},
    io::{count_frames, read_frames, FrameKind},
    rescale::Rescaler,
};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

pub fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );
    bar
}

/// A capture directory's metadata and one kind of its frames, loaded
/// up front so no I/O happens inside the pixel loops.
pub struct Capture {
    pub extremes: Vec<FrameExtremes>,
    pub frames: Vec<Array3<u8>>,
}

impl Capture {
    pub fn load(dir: &Path, kind: FrameKind) -> Result<Self> {
        let info = RunInfo::from_path(&dir.join("info.json"))
            .with_context(|| format!("reading metadata from {}", dir.display()))?;
        let extremes = info.frame_extremes()?;
        let available = count_frames(dir, kind)?;
        ensure!(
            available >= extremes.len(),
            "metadata lists {} frames but {} `{}` frames are on disk",
            extremes.len(),
            available,
            kind
        );
        let frames = read_frames(dir, kind, extremes.len())
            .with_context(|| format!("reading `{}` frames from {}", kind, dir.display()))?;
        Ok(Capture { extremes, frames })
    }
}

/// Rescale every frame of a run in parallel, with a progress bar.
pub fn rescale_frames_par(rescaler: &Rescaler, frames: &[Array3<u8>]) -> Result<Vec<Array3<u8>>> {
    let bar = progress_bar(frames.len() as u64);
    let rescaled = frames
        .par_iter()
        .enumerate()
        .progress_with(bar)
        .map(|(i, frame)| Ok(rescaler.rescale(i, frame)?))
        .collect::<Result<Vec<_>>>()?;
    Ok(rescaled)
}
