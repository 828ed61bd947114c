mod args;

use std::fs::create_dir_all;

use anyhow::{Context, Result};
use irpano::{
    cli::{rescale_frames_par, Capture},
    io::{frame_file_name, write_frame, FrameKind},
    palette::Palette,
    rescale::{RescaleOptions, Rescaler},
};

use crate::args::Args;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;

    let palette = Palette::load_path(&args.palette)
        .with_context(|| format!("loading palette {}", args.palette.display()))?;
    let capture = Capture::load(&args.capture, FrameKind::Infrared)?;

    let options = RescaleOptions {
        outlier_threshold: args.threshold,
    };
    let rescaler = Rescaler::new(capture.extremes, palette, &options)?;
    let rescaled = rescale_frames_par(&rescaler, &capture.frames)?;

    create_dir_all(&args.output)?;
    for (i, frame) in rescaled.iter().enumerate() {
        let path = args.output.join(frame_file_name(FrameKind::Infrared, i));
        write_frame(&path, frame).with_context(|| format!("writing {}", path.display()))?;
    }

    let global = rescaler.global_map();
    eprintln!("Rescaled {} frames", rescaled.len());
    eprintln!(
        "Global scale: [{:.2}, {:.2}] over {} colors",
        global.temperature_at(0),
        global.temperature_at(global.len() - 1),
        global.len()
    );
    Ok(())
}
